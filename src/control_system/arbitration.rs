//! Mode arbitration: applies override intents to the intersection state and
//! decides which precedence level governs the signal colors.

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::intersection::{IntersectionState, LightState, RoadId, TransitionPhase, TransitionState};

/// Flips the emergency override. Turning it on clears VIP; turning it off hands the
/// right-of-way back to R1 (the pre-emergency road is not remembered).
pub fn toggle_emergency(state: &IntersectionState) -> IntersectionState {
    let enabling = !state.emergency_mode;
    let mut next = *state;
    next.emergency_mode = enabling;
    next.vip_mode = false;
    if !enabling {
        restore_baseline(&mut next);
    }
    info!(
        "Emergency override {} on {}",
        if enabling { "engaged" } else { "cleared" },
        next.active_road
    );
    next
}

/// Mirror image of [`toggle_emergency`] for the VIP override.
pub fn toggle_vip(state: &IntersectionState) -> IntersectionState {
    let enabling = !state.vip_mode;
    let mut next = *state;
    next.vip_mode = enabling;
    next.emergency_mode = false;
    if !enabling {
        restore_baseline(&mut next);
    }
    info!(
        "VIP priority {} on {}",
        if enabling { "engaged" } else { "cleared" },
        next.active_road
    );
    next
}

// The active road belongs to the sequencer while a transition is in flight.
fn restore_baseline(state: &mut IntersectionState) {
    if !state.is_transitioning() {
        state.active_road = RoadId::R1;
    }
}

/// Flips the deadlock simulation flag and nothing else.
pub fn toggle_deadlock(state: &IntersectionState) -> IntersectionState {
    let mut next = *state;
    next.deadlock_mode = !state.deadlock_mode;
    info!(
        "Deadlock simulation {}",
        if next.deadlock_mode { "started" } else { "resolved" }
    );
    next
}

/// Canonical initial signal state. The selected task survives, and the transition
/// generation moves forward so writes scheduled before the reset can never match.
pub fn reset(state: &IntersectionState) -> IntersectionState {
    info!("Intersection reset to R1");
    IntersectionState {
        transition: TransitionState::idle(state.transition.generation + 1),
        task: state.task,
        ..IntersectionState::initial()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeLabel {
    Emergency,
    Vip,
    Deadlock,
    Normal,
}

impl ModeLabel {
    pub fn of(state: &IntersectionState) -> ModeLabel {
        if state.emergency_mode {
            ModeLabel::Emergency
        } else if state.vip_mode {
            ModeLabel::Vip
        } else if state.deadlock_mode {
            ModeLabel::Deadlock
        } else {
            ModeLabel::Normal
        }
    }
}

impl fmt::Display for ModeLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            ModeLabel::Emergency => "EMERGENCY",
            ModeLabel::Vip => "VIP",
            ModeLabel::Deadlock => "DEADLOCK",
            ModeLabel::Normal => "NORMAL",
        };
        write!(f, "{}", label)
    }
}

/// One precedence level of the signal-color computation.
pub struct SignalRule {
    pub name: &'static str,
    /// Whether this level governs the given state.
    pub claims: fn(&IntersectionState) -> bool,
    pub color: fn(&IntersectionState, RoadId) -> LightState,
}

/// Highest precedence first. Exactly one rule colors a given state; the last rule
/// claims everything.
pub static SIGNAL_RULES: [SignalRule; 5] = [
    SignalRule {
        name: "emergency",
        claims: |s| s.emergency_mode,
        color: override_color,
    },
    SignalRule {
        name: "vip",
        claims: |s| s.vip_mode,
        color: override_color,
    },
    SignalRule {
        name: "deadlock",
        claims: |s| s.deadlock_mode,
        color: deadlock_color,
    },
    SignalRule {
        name: "transition",
        claims: IntersectionState::is_transitioning,
        color: transition_color,
    },
    SignalRule {
        name: "normal",
        claims: |_| true,
        color: normal_color,
    },
];

pub fn governing_rule(state: &IntersectionState) -> &'static SignalRule {
    SIGNAL_RULES
        .iter()
        .find(|rule| (rule.claims)(state))
        .unwrap_or(&SIGNAL_RULES[SIGNAL_RULES.len() - 1])
}

pub fn rule_rank(name: &str) -> Option<usize> {
    SIGNAL_RULES.iter().position(|rule| rule.name == name)
}

pub fn road_color(state: &IntersectionState, road: RoadId) -> LightState {
    (governing_rule(state).color)(state, road)
}

fn override_color(state: &IntersectionState, road: RoadId) -> LightState {
    if road == state.active_road {
        LightState::Green
    } else {
        LightState::Red
    }
}

// Static stand-in for two controllers contending: R1/R2 hold amber, R3/R4 red.
fn deadlock_color(_state: &IntersectionState, road: RoadId) -> LightState {
    match road {
        RoadId::R1 | RoadId::R2 => LightState::Yellow,
        RoadId::R3 | RoadId::R4 => LightState::Red,
    }
}

fn transition_color(state: &IntersectionState, road: RoadId) -> LightState {
    let outgoing = match state.transition.pair {
        Some(pair) if state.task.is_paired() => pair.contains(road),
        Some(pair) => pair.contains(road) && road == state.active_road,
        None => false,
    };
    match (outgoing, state.transition.phase) {
        (true, TransitionPhase::Yellow) => LightState::Yellow,
        _ => LightState::Red,
    }
}

fn normal_color(state: &IntersectionState, road: RoadId) -> LightState {
    let green = if state.task.is_paired() {
        road.pair() == state.active_road.pair()
    } else {
        road == state.active_road
    };
    if green {
        LightState::Green
    } else {
        LightState::Red
    }
}
