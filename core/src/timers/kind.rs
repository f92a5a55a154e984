//! Per-kind behavior table
//!
//! Every place that branches on the timer kind (creation defaults, the tick
//! engine, resets and the UI decrement guards) reads the same `KindRules`
//! entry, so the four kinds can't drift apart between call sites.

use tabtimer_types::{DecrementGuards, TimerKind};

use crate::serde_defaults::{DEFAULT_COUNTDOWN_SECS, DEFAULT_CYCLE_SECS};

/// Where a kind's initial (and reset) time comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialTime {
    Fixed(u64),
    /// Seconds until the target date
    UntilTarget,
    /// The record's cycle duration
    CycleDuration,
}

/// How one tick advances a running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    CountUp,
    CountDown,
    /// Re-derived from the wall clock every tick
    FromTarget,
    /// Counts down, then waits for a deferred reset
    Cycle,
}

#[derive(Debug, Clone, Copy)]
pub struct KindRules {
    pub kind: TimerKind,
    pub initial_time: InitialTime,
    pub starts_running: bool,
    pub advance: Advance,
    /// Reaching zero clears `is_running`
    pub stops_at_zero: bool,
    /// UI must not decrement below zero
    pub guards_decrement: bool,
    pub has_target: bool,
    pub has_cycle: bool,
}

const STOPWATCH: KindRules = KindRules {
    kind: TimerKind::Stopwatch,
    initial_time: InitialTime::Fixed(0),
    starts_running: false,
    advance: Advance::CountUp,
    stops_at_zero: false,
    guards_decrement: true,
    has_target: false,
    has_cycle: false,
};

const COUNTDOWN: KindRules = KindRules {
    kind: TimerKind::CountdownTimer,
    initial_time: InitialTime::Fixed(DEFAULT_COUNTDOWN_SECS),
    starts_running: false,
    advance: Advance::CountDown,
    stops_at_zero: true,
    guards_decrement: false,
    has_target: false,
    has_cycle: false,
};

const TARGET_DATE: KindRules = KindRules {
    kind: TimerKind::TargetDateCountdown,
    initial_time: InitialTime::UntilTarget,
    starts_running: true,
    advance: Advance::FromTarget,
    stops_at_zero: true,
    guards_decrement: true,
    has_target: true,
    has_cycle: false,
};

const CYCLIC: KindRules = KindRules {
    kind: TimerKind::CyclicTimer,
    initial_time: InitialTime::CycleDuration,
    starts_running: false,
    advance: Advance::Cycle,
    stops_at_zero: false,
    guards_decrement: true,
    has_target: false,
    has_cycle: true,
};

/// Look up the behavior table entry for a kind
pub fn rules(kind: TimerKind) -> &'static KindRules {
    match kind {
        TimerKind::Stopwatch => &STOPWATCH,
        TimerKind::CountdownTimer => &COUNTDOWN,
        TimerKind::TargetDateCountdown => &TARGET_DATE,
        TimerKind::CyclicTimer => &CYCLIC,
    }
}

/// Cycle duration with the fallback applied
pub fn effective_cycle(cycle_duration: Option<u64>) -> u64 {
    cycle_duration
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_CYCLE_SECS)
}

/// Decrement buttons to disable for a timer showing `time` seconds.
///
/// Countdown timers never disable them (adjustments clamp at zero instead);
/// the other kinds disable the 1s / 1m / 1h step when it would go negative.
pub fn decrement_guards(kind: TimerKind, time: u64) -> DecrementGuards {
    if !rules(kind).guards_decrement {
        return DecrementGuards::default();
    }
    DecrementGuards {
        seconds: time < 1,
        minutes: time < 60,
        hours: time < 3600,
    }
}
