use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{sleep, Duration};

use crate::config::TimingConfig;
use crate::control_system::arbitration;
use crate::control_system::scheduler::CycleScheduler;
use crate::control_system::sequencer::PairTransitionSequencer;
use crate::control_system::timers::{LogicalClock, TimerRegistry};
use crate::control_system::{ControlError, IntentOutcome};
use crate::intersection::{IntersectionState, RoadId, Task};
use crate::shared_data::SignalSnapshot;

/// Owns the intersection state and every component allowed to replace it.
#[derive(Debug)]
pub struct IntersectionController {
    state: IntersectionState,
    clock: LogicalClock,
    timers: TimerRegistry,
    sequencer: PairTransitionSequencer,
    scheduler: CycleScheduler,
    paused: bool,
    /// States committed despite failing `check_invariants`.
    violations: u64,
}

impl IntersectionController {
    pub fn new(config: TimingConfig) -> Self {
        info!("Intersection controller started with {:?}", config);
        Self {
            state: IntersectionState::initial(),
            clock: LogicalClock::new(),
            timers: TimerRegistry::new(),
            sequencer: PairTransitionSequencer::new(&config),
            scheduler: CycleScheduler::new(&config),
            paused: false,
            violations: 0,
        }
    }

    pub fn state(&self) -> &IntersectionState {
        &self.state
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pending_writes(&self) -> usize {
        self.timers.pending()
    }

    pub fn invariant_violations(&self) -> u64 {
        self.violations
    }

    fn commit(&mut self, next: IntersectionState) {
        if let Err(violation) = next.check_invariants() {
            warn!("State at t={} violates an invariant: {}", self.now(), violation);
            self.violations += 1;
        }
        self.state = next;
    }

    // Manual road selection. Ignored while a handover is in flight.
    pub fn select_road(&mut self, road: u8) -> Result<IntentOutcome, ControlError> {
        let road = RoadId::try_from(road)?;
        let (next, outcome) =
            self.sequencer
                .request(&self.state, road, self.clock.now(), &mut self.timers);
        self.commit(next);
        Ok(outcome)
    }

    pub fn toggle_emergency(&mut self) {
        let next = arbitration::toggle_emergency(&self.state);
        self.commit(next);
    }

    pub fn toggle_vip(&mut self) {
        let next = arbitration::toggle_vip(&self.state);
        self.commit(next);
    }

    pub fn toggle_deadlock(&mut self) {
        let next = arbitration::toggle_deadlock(&self.state);
        self.commit(next);
    }

    /// Back to the initial signal state. Pending phase writes are discarded.
    pub fn reset(&mut self) {
        let dropped = self.timers.cancel_all();
        if dropped > 0 {
            debug!("Reset discarded {} pending phase writes", dropped);
        }
        let next = arbitration::reset(&self.state);
        self.commit(next);
        self.scheduler.restart();
    }

    /// Switches the scheduling policy. Signal fields are left untouched.
    pub fn select_task(&mut self, id: u8) -> Result<Task, ControlError> {
        let task = Task::from_id(id).ok_or(ControlError::InvalidTask(id))?;
        if task != self.state.task {
            info!("Switching to {}", task);
            self.scheduler.restart();
            let mut next = self.state;
            next.task = task;
            self.commit(next);
        }
        Ok(task)
    }

    pub fn pause(&mut self) {
        if !self.paused {
            info!("Clock paused at t={}", self.now());
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            info!("Clock resumed at t={}", self.now());
        }
        self.paused = false;
    }

    /// One time-unit: fire due phase writes in due order, then let the cycle
    /// scheduler act on the result.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        self.scheduler.observe(&self.state);
        let now = self.clock.advance();
        for write in self.timers.drain_due(now) {
            let next = self.sequencer.apply(&self.state, &write);
            self.commit(next);
        }
        let next = self
            .scheduler
            .on_tick(&self.state, now, &self.sequencer, &mut self.timers);
        self.commit(next);
    }

    pub fn advance(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot::from_state(&self.state, self.clock.now(), self.paused)
    }

    // Runs a dedicated update loop that ticks the controller once per period and
    // hands every snapshot to `observer`. Intended to be spawned as an async task.
    pub async fn run_update_loop<F>(
        controller: Arc<Mutex<Self>>,
        period: Duration,
        mut observer: F,
    ) where
        F: FnMut(&SignalSnapshot) + Send,
    {
        loop {
            sleep(period).await;
            let snapshot = {
                let mut ctrl = controller.lock().unwrap_or_else(PoisonError::into_inner);
                if ctrl.is_paused() {
                    continue;
                }
                ctrl.tick();
                ctrl.snapshot()
            };
            observer(&snapshot);
        }
    }
}

impl Default for IntersectionController {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersection::{LightState, Pair, TransitionPhase};

    #[test]
    fn reset_drops_pending_handover() {
        let mut ctrl = IntersectionController::default();
        assert_eq!(ctrl.select_road(2), Ok(IntentOutcome::TransitionStarted));
        assert_eq!(ctrl.pending_writes(), 2);
        ctrl.reset();
        assert_eq!(ctrl.pending_writes(), 0);
        ctrl.advance(3);
        assert_eq!(ctrl.state().active_road, RoadId::R1);
        assert!(ctrl.state().transition.is_idle());
    }

    #[test]
    fn paused_clock_holds_everything() {
        let mut ctrl = IntersectionController::default();
        ctrl.select_road(4).unwrap();
        ctrl.pause();
        ctrl.advance(10);
        assert_eq!(ctrl.now(), 0);
        assert_eq!(ctrl.state().transition.phase, TransitionPhase::Yellow);
        ctrl.resume();
        ctrl.advance(3);
        assert_eq!(ctrl.state().active_road, RoadId::R4);
    }

    #[test]
    fn invalid_ids_are_errors() {
        let mut ctrl = IntersectionController::default();
        assert_eq!(ctrl.select_road(7), Err(ControlError::InvalidRoad(7)));
        assert_eq!(ctrl.select_task(0), Err(ControlError::InvalidTask(0)));
        assert_eq!(ctrl.state(), &IntersectionState::initial());
    }

    #[test]
    fn select_task_only_touches_the_selector() {
        let mut ctrl = IntersectionController::default();
        ctrl.select_road(3).unwrap();
        assert_eq!(ctrl.select_task(2), Ok(Task::SignalController));
        assert_eq!(ctrl.state().active_road, RoadId::R3);
        let snapshot = ctrl.snapshot();
        assert_eq!(snapshot.color_of(RoadId::R1), LightState::Green);
        assert_eq!(snapshot.color_of(RoadId::R3), LightState::Green);
        assert_eq!(snapshot.task_id, 2);
    }

    #[test]
    fn busy_session_commits_no_violations() {
        let mut ctrl = IntersectionController::default();
        ctrl.select_task(2).unwrap();
        ctrl.select_road(2).unwrap();
        ctrl.toggle_emergency();
        ctrl.toggle_vip();
        ctrl.advance(4);
        ctrl.toggle_deadlock();
        ctrl.toggle_vip();
        ctrl.advance(7);
        ctrl.toggle_deadlock();
        ctrl.select_task(1).unwrap();
        ctrl.advance(12);
        ctrl.reset();
        assert_eq!(ctrl.invariant_violations(), 0);
    }

    #[test]
    fn manual_handover_in_paired_mode_holds_the_new_pair() {
        let mut ctrl = IntersectionController::default();
        ctrl.select_task(2).unwrap();
        ctrl.advance(4);
        assert_eq!(ctrl.select_road(2), Ok(IntentOutcome::TransitionStarted));
        ctrl.advance(3);
        assert_eq!(ctrl.now(), 7);
        assert_eq!(ctrl.state().active_road, RoadId::R2);
        assert!(ctrl.state().transition.is_idle());

        let mut green_ticks = 0;
        while ctrl.state().transition.is_idle() {
            let snapshot = ctrl.snapshot();
            assert_eq!(snapshot.green_roads(), vec![RoadId::R2, RoadId::R4]);
            green_ticks += 1;
            ctrl.tick();
        }
        assert_eq!(green_ticks, 6);
        assert_eq!(ctrl.state().transition.pair, Some(Pair::Pair24));
    }

    #[test]
    fn round_robin_road_landed_by_handover_holds_full_period() {
        let mut ctrl = IntersectionController::default();
        ctrl.select_road(2).unwrap();
        ctrl.advance(3);
        assert_eq!(ctrl.state().active_road, RoadId::R2);

        let mut held = 0;
        while ctrl.state().active_road == RoadId::R2 {
            held += 1;
            ctrl.tick();
        }
        assert_eq!(held, 5);
        assert_eq!(ctrl.state().active_road, RoadId::R3);
    }

    #[tokio::test(start_paused = true)]
    async fn update_loop_ticks_on_its_period() {
        let controller = Arc::new(Mutex::new(IntersectionController::default()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = tokio::spawn(IntersectionController::run_update_loop(
            Arc::clone(&controller),
            Duration::from_secs(1),
            move |snapshot: &SignalSnapshot| sink.lock().unwrap().push(snapshot.time),
        ));

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        handle.abort();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(controller.lock().unwrap().state().active_road, RoadId::R2);
    }
}
