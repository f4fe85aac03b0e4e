use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight teaching tasks. The selected task decides which cycle scheduler runs
/// and which extra indicators the snapshot carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    #[default]
    TrafficSignals,
    SignalController,
    TrafficCoordination,
    ClockSynchronization,
    CriticalSection,
    DeadlockPrevention,
    LoadBalancing,
    DataConsistency,
}

impl Task {
    pub const ALL: [Task; 8] = [
        Task::TrafficSignals,
        Task::SignalController,
        Task::TrafficCoordination,
        Task::ClockSynchronization,
        Task::CriticalSection,
        Task::DeadlockPrevention,
        Task::LoadBalancing,
        Task::DataConsistency,
    ];

    pub fn from_id(id: u8) -> Option<Task> {
        match id {
            1..=8 => Some(Self::ALL[(id - 1) as usize]),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Task::TrafficSignals => 1,
            Task::SignalController => 2,
            Task::TrafficCoordination => 3,
            Task::ClockSynchronization => 4,
            Task::CriticalSection => 5,
            Task::DeadlockPrevention => 6,
            Task::LoadBalancing => 7,
            Task::DataConsistency => 8,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Task::TrafficSignals => "Traffic Signals",
            Task::SignalController => "Signal Controller",
            Task::TrafficCoordination => "Traffic Coordination",
            Task::ClockSynchronization => "Clock Synchronization",
            Task::CriticalSection => "Critical Section",
            Task::DeadlockPrevention => "Deadlock Prevention",
            Task::LoadBalancing => "Load Balancing",
            Task::DataConsistency => "Data Consistency",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Task::TrafficSignals => "Basic traffic light control",
            Task::SignalController => "Central control system",
            Task::TrafficCoordination => "Multi-signal coordination",
            Task::ClockSynchronization => "Time-based coordination",
            Task::CriticalSection => "Active road priority",
            Task::DeadlockPrevention => "Conflict resolution",
            Task::LoadBalancing => "Primary/Backup controllers",
            Task::DataConsistency => "Synchronized database",
        }
    }

    /// Longer explanation shown when the task is selected.
    pub fn info(self) -> &'static str {
        match self {
            Task::TrafficSignals => {
                "Four roads with vehicle and pedestrian signals. One road is green at a time; pedestrians cross on red roads."
            }
            Task::SignalController => {
                "A central controller drives every signal, alternating the R1/R3 and R2/R4 pairs."
            }
            Task::TrafficCoordination => {
                "Signals share coordinated timing to keep traffic moving through the intersection."
            }
            Task::ClockSynchronization => {
                "A master clock keeps the road controllers on the same time base."
            }
            Task::CriticalSection => {
                "The intersection is a critical section: only the active road may enter it."
            }
            Task::DeadlockPrevention => {
                "Two roads waiting on the critical section are detected and resolved by priority."
            }
            Task::LoadBalancing => {
                "Primary and backup controllers, with failover when the primary is lost."
            }
            Task::DataConsistency => {
                "Signal, pedestrian and clock state is shared so every controller sees the same values."
            }
        }
    }

    /// Whether this task runs opposite roads as pairs (R1+R3, R2+R4).
    pub fn is_paired(self) -> bool {
        self == Task::SignalController
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Task {}: {}", self.id(), self.title())
    }
}

/// Unknown task ids get an empty description instead of an error.
pub fn description_for(id: u8) -> &'static str {
    Task::from_id(id).map(Task::description).unwrap_or("")
}

pub fn info_for(id: u8) -> &'static str {
    Task::from_id(id).map(Task::info).unwrap_or("")
}
