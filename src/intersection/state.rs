use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::intersection::roads::{Pair, RoadId};
use crate::intersection::tasks::Task;

/// Step of the timed handover between pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionPhase {
    #[default]
    Idle,
    Yellow,
    Red,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            TransitionPhase::Idle => "idle",
            TransitionPhase::Yellow => "yellow",
            TransitionPhase::Red => "red",
        };
        write!(f, "{}", label)
    }
}

/// The in-flight pair transition, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionState {
    pub phase: TransitionPhase,
    /// The outgoing pair while a transition runs.
    pub pair: Option<Pair>,
    /// The road that takes over once the transition lands.
    pub target: Option<RoadId>,
    /// Identity of the most recently started transition. Only grows.
    pub generation: u64,
}

impl TransitionState {
    pub fn idle(generation: u64) -> Self {
        Self {
            phase: TransitionPhase::Idle,
            pair: None,
            target: None,
            generation,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TransitionPhase::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("emergency and VIP overrides are both active")]
    ConflictingOverrides,
    #[error("transition phase {0} has no outgoing pair")]
    PhaseWithoutPair(TransitionPhase),
    #[error("idle transition still references pair {0}")]
    IdleWithPair(Pair),
}

/// The single record every controller component reads and replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionState {
    pub active_road: RoadId,
    pub emergency_mode: bool,
    pub vip_mode: bool,
    pub deadlock_mode: bool,
    pub transition: TransitionState,
    /// Selector over the scheduling policy, not part of the signal logic itself.
    pub task: Task,
}

impl IntersectionState {
    pub fn initial() -> Self {
        Self {
            active_road: RoadId::R1,
            emergency_mode: false,
            vip_mode: false,
            deadlock_mode: false,
            transition: TransitionState::default(),
            task: Task::default(),
        }
    }

    pub fn is_transitioning(&self) -> bool {
        !self.transition.is_idle()
    }

    pub fn has_override(&self) -> bool {
        self.emergency_mode || self.vip_mode
    }

    /// Overrides and deadlock simulation both freeze autonomous cycling.
    pub fn cycling_suspended(&self) -> bool {
        self.has_override() || self.deadlock_mode
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.emergency_mode && self.vip_mode {
            return Err(InvariantViolation::ConflictingOverrides);
        }
        match (self.transition.phase, self.transition.pair) {
            (TransitionPhase::Idle, Some(pair)) => Err(InvariantViolation::IdleWithPair(pair)),
            (phase, None) if phase != TransitionPhase::Idle => {
                Err(InvariantViolation::PhaseWithoutPair(phase))
            }
            _ => Ok(()),
        }
    }
}

impl Default for IntersectionState {
    fn default() -> Self {
        Self::initial()
    }
}
