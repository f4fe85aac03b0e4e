// src/shared_data.rs

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::control_system::arbitration::{road_color, ModeLabel};
use crate::intersection::{IntersectionState, LightState, Pair, RoadId, Task, TransitionPhase};

/// What the rendering layer needs to draw one approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadSignal {
    pub road: RoadId,
    pub color: LightState,
    /// An emergency vehicle holds this road.
    pub emergency: bool,
    /// A VIP convoy holds this road.
    pub vip: bool,
    /// Pedestrians may cross: the vehicle signal is red.
    pub pedestrian_walk: bool,
}

/// Read-only view of the controller at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    /// Logical time-units since start.
    pub time: u64,
    pub task_id: u8,
    pub task_title: String,
    pub mode: ModeLabel,
    pub active_road: RoadId,
    pub roads: Vec<RoadSignal>,
    pub transition_phase: TransitionPhase,
    pub transition_pair: Option<Pair>,
    /// Manual road selection is disabled while a handover runs.
    pub controls_locked: bool,
    /// Task 5 shows which road currently owns the intersection.
    pub critical_section: Option<RoadId>,
    /// Task 6 raises this while the deadlock simulation runs.
    pub deadlock_detected: bool,
    pub paused: bool,
}

impl SignalSnapshot {
    pub fn from_state(state: &IntersectionState, time: u64, paused: bool) -> Self {
        let roads = RoadId::ALL
            .iter()
            .map(|&road| {
                let color = road_color(state, road);
                let holds_road = road == state.active_road;
                RoadSignal {
                    road,
                    color,
                    emergency: state.emergency_mode && holds_road,
                    vip: state.vip_mode && holds_road,
                    pedestrian_walk: color == LightState::Red,
                }
            })
            .collect();

        Self {
            time,
            task_id: state.task.id(),
            task_title: state.task.title().to_string(),
            mode: ModeLabel::of(state),
            active_road: state.active_road,
            roads,
            transition_phase: state.transition.phase,
            transition_pair: state.transition.pair,
            controls_locked: state.is_transitioning(),
            critical_section: (state.task == Task::CriticalSection).then_some(state.active_road),
            deadlock_detected: state.task == Task::DeadlockPrevention && state.deadlock_mode,
            paused,
        }
    }

    pub fn color_of(&self, road: RoadId) -> LightState {
        self.signal(road).map(|s| s.color).unwrap_or(LightState::Red)
    }

    pub fn signal(&self, road: RoadId) -> Option<&RoadSignal> {
        self.roads.iter().find(|s| s.road == road)
    }

    pub fn green_roads(&self) -> Vec<RoadId> {
        self.roads
            .iter()
            .filter(|s| s.color == LightState::Green)
            .map(|s| s.road)
            .collect()
    }
}

/// Get current timestamp in seconds since UNIX epoch
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pedestrians_walk_exactly_on_red() {
        let state = IntersectionState {
            active_road: RoadId::R2,
            ..IntersectionState::initial()
        };
        let snapshot = SignalSnapshot::from_state(&state, 0, false);
        for signal in &snapshot.roads {
            assert_eq!(signal.pedestrian_walk, signal.color == LightState::Red);
        }
        assert_eq!(snapshot.green_roads(), vec![RoadId::R2]);
    }

    #[test]
    fn task_indicators_follow_task() {
        let state = IntersectionState {
            active_road: RoadId::R4,
            deadlock_mode: true,
            task: Task::CriticalSection,
            ..IntersectionState::initial()
        };
        let snapshot = SignalSnapshot::from_state(&state, 3, false);
        assert_eq!(snapshot.critical_section, Some(RoadId::R4));
        assert!(!snapshot.deadlock_detected);

        let state = IntersectionState {
            task: Task::DeadlockPrevention,
            ..state
        };
        let snapshot = SignalSnapshot::from_state(&state, 3, false);
        assert_eq!(snapshot.critical_section, None);
        assert!(snapshot.deadlock_detected);
        assert_eq!(snapshot.mode, ModeLabel::Deadlock);
    }

    #[test]
    fn emergency_flag_marks_only_the_held_road() {
        let state = IntersectionState {
            active_road: RoadId::R3,
            emergency_mode: true,
            ..IntersectionState::initial()
        };
        let snapshot = SignalSnapshot::from_state(&state, 0, false);
        let flagged: Vec<RoadId> = snapshot
            .roads
            .iter()
            .filter(|s| s.emergency)
            .map(|s| s.road)
            .collect();
        assert_eq!(flagged, vec![RoadId::R3]);
        assert!(snapshot.roads.iter().all(|s| !s.vip));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = SignalSnapshot::from_state(&IntersectionState::initial(), 7, true);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["time"], 7);
        assert_eq!(json["mode"], "Normal");
        assert_eq!(json["roads"][0]["color"], "Green");
        assert_eq!(json["paused"], true);
    }
}
