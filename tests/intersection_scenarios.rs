//! End-to-end behaviour of the controller through its public intents.

use smart_intersection::control_system::{IntentOutcome, IntersectionController, ModeLabel};
use smart_intersection::intersection::{
    IntersectionState, LightState, Pair, RoadId, TransitionPhase,
};

fn colors(ctrl: &IntersectionController) -> Vec<LightState> {
    let snapshot = ctrl.snapshot();
    RoadId::ALL.iter().map(|&r| snapshot.color_of(r)).collect()
}

#[test]
fn same_pair_selection_is_immediate() {
    let mut ctrl = IntersectionController::default();
    assert_eq!(ctrl.select_road(3), Ok(IntentOutcome::Applied));
    assert_eq!(ctrl.state().active_road, RoadId::R3);
    assert!(ctrl.state().transition.is_idle());
    assert_eq!(ctrl.pending_writes(), 0);
}

#[test]
fn cross_pair_selection_runs_yellow_red_green() {
    let mut ctrl = IntersectionController::default();
    assert_eq!(ctrl.select_road(2), Ok(IntentOutcome::TransitionStarted));
    assert_eq!(ctrl.state().transition.phase, TransitionPhase::Yellow);
    assert_eq!(ctrl.state().transition.pair, Some(Pair::Pair13));
    assert_eq!(ctrl.state().active_road, RoadId::R1);

    ctrl.advance(2);
    assert_eq!(ctrl.state().transition.phase, TransitionPhase::Red);
    assert_eq!(ctrl.state().active_road, RoadId::R1);

    ctrl.tick();
    assert_eq!(ctrl.state().active_road, RoadId::R2);
    assert!(ctrl.state().transition.is_idle());
    assert_eq!(ctrl.state().transition.pair, None);
}

#[test]
fn transition_timing_is_anchored_to_request_time() {
    let mut ctrl = IntersectionController::default();
    ctrl.advance(2);
    let t0 = ctrl.now();
    ctrl.select_road(4).unwrap();

    let mut observed = Vec::new();
    for _ in 0..4 {
        observed.push((ctrl.now() - t0, ctrl.state().transition.phase, ctrl.state().active_road));
        ctrl.tick();
    }
    assert_eq!(
        observed,
        vec![
            (0, TransitionPhase::Yellow, RoadId::R1),
            (1, TransitionPhase::Yellow, RoadId::R1),
            (2, TransitionPhase::Red, RoadId::R1),
            (3, TransitionPhase::Idle, RoadId::R4),
        ]
    );
}

#[test]
fn road_selection_is_ignored_mid_transition() {
    let mut ctrl = IntersectionController::default();
    ctrl.select_road(2).unwrap();
    ctrl.tick();
    assert_eq!(ctrl.select_road(3), Ok(IntentOutcome::Ignored));
    assert!(ctrl.snapshot().controls_locked);
    ctrl.advance(2);
    assert_eq!(ctrl.state().active_road, RoadId::R2);
    assert!(!ctrl.snapshot().controls_locked);
}

#[test]
fn emergency_toggle_round_trip() {
    let mut ctrl = IntersectionController::default();
    ctrl.toggle_emergency();
    assert!(ctrl.state().emergency_mode);
    assert!(!ctrl.state().vip_mode);
    assert_eq!(ctrl.snapshot().mode, ModeLabel::Emergency);
    assert!(ctrl.snapshot().roads[0].emergency);

    ctrl.toggle_emergency();
    assert!(!ctrl.state().emergency_mode);
    assert_eq!(ctrl.state().active_road, RoadId::R1);
    assert_eq!(ctrl.snapshot().mode, ModeLabel::Normal);
}

#[test]
fn deadlock_renders_fixed_split() {
    let mut ctrl = IntersectionController::default();
    ctrl.select_road(3).unwrap();
    ctrl.toggle_deadlock();
    assert_eq!(
        colors(&ctrl),
        vec![LightState::Yellow, LightState::Yellow, LightState::Red, LightState::Red]
    );
    ctrl.advance(20);
    assert_eq!(ctrl.state().active_road, RoadId::R3);
}

#[test]
fn reset_from_busy_state_is_canonical() {
    let mut ctrl = IntersectionController::default();
    ctrl.select_task(2).unwrap();
    ctrl.select_road(4).unwrap();
    ctrl.toggle_vip();
    ctrl.toggle_deadlock();
    ctrl.tick();
    ctrl.reset();

    let state = ctrl.state();
    let initial = IntersectionState::initial();
    assert_eq!(state.active_road, initial.active_road);
    assert!(!state.emergency_mode && !state.vip_mode && !state.deadlock_mode);
    assert!(state.transition.is_idle());
    assert_eq!(ctrl.pending_writes(), 0);
}

#[test]
fn round_robin_walks_every_road() {
    let mut ctrl = IntersectionController::default();
    let mut order = vec![ctrl.state().active_road];
    for _ in 0..4 {
        ctrl.advance(5);
        order.push(ctrl.state().active_road);
    }
    assert_eq!(
        order,
        vec![RoadId::R1, RoadId::R2, RoadId::R3, RoadId::R4, RoadId::R1]
    );
}

#[test]
fn central_controller_alternates_pairs() {
    let mut ctrl = IntersectionController::default();
    ctrl.select_task(2).unwrap();
    assert_eq!(
        colors(&ctrl),
        vec![LightState::Green, LightState::Red, LightState::Green, LightState::Red]
    );

    ctrl.advance(6);
    assert_eq!(
        colors(&ctrl),
        vec![LightState::Yellow, LightState::Red, LightState::Yellow, LightState::Red]
    );
    ctrl.advance(2);
    assert!(colors(&ctrl).iter().all(|&c| c == LightState::Red));
    ctrl.tick();
    assert_eq!(
        colors(&ctrl),
        vec![LightState::Red, LightState::Green, LightState::Red, LightState::Green]
    );
}

#[test]
fn override_outlasts_handover_without_losing_it() {
    let mut ctrl = IntersectionController::default();
    ctrl.select_road(2).unwrap();
    ctrl.toggle_emergency();
    assert_eq!(ctrl.snapshot().green_roads(), vec![RoadId::R1]);

    ctrl.advance(3);
    assert_eq!(ctrl.state().active_road, RoadId::R2);
    assert!(ctrl.state().emergency_mode);
    assert_eq!(ctrl.snapshot().green_roads(), vec![RoadId::R2]);
}

#[test]
fn stale_writes_never_land_after_reset() {
    let mut ctrl = IntersectionController::default();
    ctrl.select_road(2).unwrap();
    ctrl.tick();
    ctrl.reset();
    ctrl.select_road(3).unwrap();
    ctrl.advance(3);
    assert_eq!(ctrl.state().active_road, RoadId::R3);
    assert!(ctrl.state().transition.is_idle());
}
