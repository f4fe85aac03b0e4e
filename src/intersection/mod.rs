// intersection/mod.rs
pub mod roads;
pub mod state;
pub mod tasks;

pub use roads::{LightState, Pair, RoadId};
pub use state::{IntersectionState, InvariantViolation, TransitionPhase, TransitionState};
pub use tasks::Task;
