use log::{debug, info};

use crate::config::TimingConfig;
use crate::control_system::sequencer::PairTransitionSequencer;
use crate::control_system::timers::TimerRegistry;
use crate::intersection::{IntersectionState, RoadId, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// One road at a time, R1 -> R2 -> R3 -> R4 -> R1.
    RoundRobin,
    /// Opposite pairs alternate through the phased handover.
    Paired,
}

impl CycleMode {
    pub fn for_task(task: Task) -> CycleMode {
        if task.is_paired() {
            CycleMode::Paired
        } else {
            CycleMode::RoundRobin
        }
    }
}

/// Advances the right-of-way on its own when nothing overrides it.
///
/// Both modes count whole time-units for the road currently holding the
/// right-of-way. Any change of active road restarts the count, and the tick in
/// which a handover lands is not counted, so every road (or pair) that takes over
/// is held for a full period.
#[derive(Debug, Clone)]
pub struct CycleScheduler {
    pub round_robin_period: u64,
    pub paired_period: u64,
    elapsed: u64,
    /// Road the count is running for.
    counting_for: Option<RoadId>,
}

impl CycleScheduler {
    pub fn new(config: &TimingConfig) -> Self {
        Self {
            round_robin_period: config.round_robin_period,
            paired_period: config.paired_cycle_period,
            elapsed: 0,
            counting_for: None,
        }
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    // Task changes and resets start a fresh cycle.
    pub fn restart(&mut self) {
        self.elapsed = 0;
        self.counting_for = None;
    }

    /// Picks up road changes made by intents since the last tick. Called with the
    /// state as it stands before the clock moves.
    pub fn observe(&mut self, state: &IntersectionState) {
        if self.counting_for != Some(state.active_road) {
            self.counting_for = Some(state.active_road);
            self.elapsed = 0;
        }
    }

    fn period(&self, mode: CycleMode) -> u64 {
        match mode {
            CycleMode::RoundRobin => self.round_robin_period,
            CycleMode::Paired => self.paired_period,
        }
    }

    pub fn on_tick(
        &mut self,
        state: &IntersectionState,
        now: u64,
        sequencer: &PairTransitionSequencer,
        timers: &mut TimerRegistry,
    ) -> IntersectionState {
        if state.cycling_suspended() || state.is_transitioning() {
            return *state;
        }
        // A road that landed during this tick starts counting on the next one.
        if self.counting_for != Some(state.active_road) {
            debug!("t={}: {} took over, cycle count restarted", now, state.active_road);
            self.counting_for = Some(state.active_road);
            self.elapsed = 0;
            return *state;
        }

        let mode = CycleMode::for_task(state.task);
        self.elapsed += 1;
        if self.elapsed < self.period(mode) {
            return *state;
        }
        self.elapsed = 0;

        match mode {
            CycleMode::RoundRobin => {
                let mut next = *state;
                next.active_road = state.active_road.next();
                self.counting_for = Some(next.active_road);
                info!(
                    "Round-robin at t={}: {} -> {}",
                    now, state.active_road, next.active_road
                );
                next
            }
            CycleMode::Paired => {
                let target = state.active_road.pair().opposite().entry_road();
                let (next, _) = sequencer.request(state, target, now, timers);
                next
            }
        }
    }
}

impl Default for CycleScheduler {
    fn default() -> Self {
        Self::new(&TimingConfig::default())
    }
}
