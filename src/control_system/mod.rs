// control_system/mod.rs
pub mod arbitration;
pub mod scheduler;
pub mod sequencer;
pub mod timers;
pub mod traffic_light_controller;

use thiserror::Error;

pub use arbitration::{road_color, ModeLabel};
pub use traffic_light_controller::IntersectionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("road R{0} does not exist (expected 1-4)")]
    InvalidRoad(u8),
    #[error("task {0} does not exist (expected 1-8)")]
    InvalidTask(u8),
}

/// What a road-selection intent ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The active road changed immediately.
    Applied,
    /// A timed yellow/red handover to the other pair began.
    TransitionStarted,
    /// Nothing changed: same road, or a transition is already in flight.
    Ignored,
}
