use log::{debug, info};

use crate::config::TimingConfig;
use crate::control_system::timers::{PhaseWrite, ScheduledWrite, TimerRegistry};
use crate::control_system::IntentOutcome;
use crate::intersection::{IntersectionState, RoadId, TransitionPhase, TransitionState};

/// Runs the yellow -> red -> green handover whenever the right-of-way moves to the
/// other pair. Both follow-up writes are anchored to the request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairTransitionSequencer {
    pub yellow_duration: u64,
    pub red_duration: u64,
}

impl PairTransitionSequencer {
    pub fn new(config: &TimingConfig) -> Self {
        Self {
            yellow_duration: config.yellow_duration,
            red_duration: config.red_duration,
        }
    }

    pub fn total_duration(&self) -> u64 {
        self.yellow_duration + self.red_duration
    }

    // Moves the right-of-way to `target`. Same-pair moves are immediate; cross-pair
    // moves enter Yellow now and schedule the rest.
    pub fn request(
        &self,
        state: &IntersectionState,
        target: RoadId,
        now: u64,
        timers: &mut TimerRegistry,
    ) -> (IntersectionState, IntentOutcome) {
        if state.is_transitioning() {
            debug!("Ignoring request for {}: transition in flight", target);
            return (*state, IntentOutcome::Ignored);
        }
        if target == state.active_road {
            return (*state, IntentOutcome::Ignored);
        }

        let outgoing = state.active_road.pair();
        let mut next = *state;
        if target.pair() == outgoing {
            next.active_road = target;
            info!("Active road {} -> {} (same pair)", state.active_road, target);
            return (next, IntentOutcome::Applied);
        }

        let generation = state.transition.generation + 1;
        next.transition = TransitionState {
            phase: TransitionPhase::Yellow,
            pair: Some(outgoing),
            target: Some(target),
            generation,
        };
        timers.schedule(now + self.yellow_duration, generation, PhaseWrite::EnterRed);
        timers.schedule(now + self.total_duration(), generation, PhaseWrite::Complete);
        info!(
            "Transition #{} started at t={}: pair {} yellow, {} takes over at t={}",
            generation,
            now,
            outgoing,
            target,
            now + self.total_duration()
        );
        (next, IntentOutcome::TransitionStarted)
    }

    /// Applies a fired write if it still belongs to the in-flight transition.
    pub fn apply(&self, state: &IntersectionState, write: &ScheduledWrite) -> IntersectionState {
        if !state.is_transitioning() || write.generation != state.transition.generation {
            debug!(
                "Dropping stale {:?} for transition #{} (current #{})",
                write.action, write.generation, state.transition.generation
            );
            return *state;
        }

        let mut next = *state;
        match write.action {
            PhaseWrite::EnterRed => {
                next.transition.phase = TransitionPhase::Red;
                info!("Transition #{} at t={}: outgoing pair red", write.generation, write.due);
            }
            PhaseWrite::Complete => {
                if let Some(target) = state.transition.target {
                    next.active_road = target;
                }
                next.transition = TransitionState::idle(state.transition.generation);
                info!(
                    "Transition #{} complete at t={}: {} has the right-of-way",
                    write.generation, write.due, next.active_road
                );
            }
        }
        next
    }
}

impl Default for PairTransitionSequencer {
    fn default() -> Self {
        Self::new(&TimingConfig::default())
    }
}
