//! Timer record construction and updates
//!
//! Records are treated as values: every change goes through one of the
//! `with_*` functions below, which return a new record and carry every other
//! field over untouched.

use chrono::{DateTime, Utc};
use tabtimer_types::formatting::{format_record, remaining_fraction};
use tabtimer_types::{DecrementGuards, TimerKind, TimerRecord, TimerView};

use crate::serde_defaults::default_target_offset;
use crate::storage::StoredTimer;

use super::TimerError;
use super::color::{normalize_color, random_background};
use super::kind::{Advance, InitialTime, KindRules, decrement_guards, effective_cycle, rules};
use super::target::{format_target, remaining_for};

/// Field values to use instead of the kind defaults when creating a record
#[derive(Debug, Clone, Default)]
pub struct TimerOverrides {
    pub name: Option<String>,
    pub time: Option<u64>,
    pub is_running: Option<bool>,
    pub background_color: Option<String>,
    pub target_date_time: Option<String>,
    pub cycle_duration: Option<u64>,
}

/// Create a record from a kind tag, rejecting unknown kinds
pub fn create(
    kind: &str,
    id: u64,
    overrides: TimerOverrides,
    now: DateTime<Utc>,
) -> Result<TimerRecord, TimerError> {
    let kind = TimerKind::from_tag(kind).ok_or_else(|| TimerError::InvalidType {
        kind: kind.to_string(),
    })?;
    Ok(build(kind, id, overrides, now))
}

/// Create a record of a known kind, filling every field the overrides leave out
pub fn build(
    kind: TimerKind,
    id: u64,
    overrides: TimerOverrides,
    now: DateTime<Utc>,
) -> TimerRecord {
    let rules = rules(kind);

    let cycle_duration = rules
        .has_cycle
        .then(|| effective_cycle(overrides.cycle_duration));
    let target_date_time = rules.has_target.then(|| {
        overrides
            .target_date_time
            .unwrap_or_else(|| format_target(now + default_target_offset()))
    });
    let background_color = overrides
        .background_color
        .as_deref()
        .map(normalize_color)
        .unwrap_or_else(random_background);

    let mut record = TimerRecord {
        id,
        name: overrides.name.unwrap_or_default(),
        kind,
        time: 0,
        is_running: overrides.is_running.unwrap_or(rules.starts_running),
        background_color,
        target_date_time,
        cycle_duration,
    };
    record.time = overrides
        .time
        .unwrap_or_else(|| initial_time(&record, now));
    record
}

/// The time a record starts from (and returns to on reset)
pub fn initial_time(record: &TimerRecord, now: DateTime<Utc>) -> u64 {
    match rules(record.kind).initial_time {
        InitialTime::Fixed(secs) => secs,
        InitialTime::UntilTarget => {
            remaining_for(record.target_date_time.as_deref(), now).unwrap_or(0)
        }
        InitialTime::CycleDuration => effective_cycle(record.cycle_duration),
    }
}

/// Turn a leniently-decoded stored record into a canonical one.
///
/// Missing fields get the kind defaults; a missing kind means stopwatch
/// (the only kind older data knew about).
pub fn from_stored(
    stored: StoredTimer,
    fallback_id: u64,
    now: DateTime<Utc>,
) -> Result<TimerRecord, TimerError> {
    let kind = match stored.kind.as_deref() {
        None => TimerKind::Stopwatch,
        Some(tag) => TimerKind::from_tag(tag).ok_or_else(|| TimerError::InvalidType {
            kind: tag.to_string(),
        })?,
    };

    let overrides = TimerOverrides {
        name: stored.name,
        time: stored.time.map(|t| t.max(0) as u64),
        is_running: Some(stored.is_running.unwrap_or(false)),
        background_color: stored.background_color,
        target_date_time: stored.target_date_time,
        cycle_duration: stored.cycle_duration.filter(|s| *s > 0).map(|s| s as u64),
    };

    Ok(build(kind, stored.id.unwrap_or(fallback_id), overrides, now))
}

// ═══════════════════════════════════════════════════════════════════════════
// Immutable Updates
// ═══════════════════════════════════════════════════════════════════════════

pub trait RecordExt: Sized {
    fn with_running(self, is_running: bool) -> Self;
    fn with_time(self, time: u64) -> Self;
    fn with_name(self, name: String) -> Self;
    fn with_background(self, background_color: String) -> Self;
    fn with_target(self, target_date_time: String) -> Self;
    fn with_cycle_duration(self, secs: u64) -> Self;

    fn rules(&self) -> &'static KindRules;
    fn decrement_guards(&self) -> DecrementGuards;
    fn view(&self, reset_pending: bool) -> TimerView;
}

impl RecordExt for TimerRecord {
    fn with_running(self, is_running: bool) -> Self {
        TimerRecord { is_running, ..self }
    }

    fn with_time(self, time: u64) -> Self {
        TimerRecord { time, ..self }
    }

    fn with_name(self, name: String) -> Self {
        TimerRecord { name, ..self }
    }

    fn with_background(self, background_color: String) -> Self {
        TimerRecord {
            background_color,
            ..self
        }
    }

    fn with_target(self, target_date_time: String) -> Self {
        TimerRecord {
            target_date_time: Some(target_date_time),
            ..self
        }
    }

    fn with_cycle_duration(self, secs: u64) -> Self {
        TimerRecord {
            cycle_duration: Some(secs),
            ..self
        }
    }

    fn rules(&self) -> &'static KindRules {
        rules(self.kind)
    }

    fn decrement_guards(&self) -> DecrementGuards {
        decrement_guards(self.kind, self.time)
    }

    fn view(&self, reset_pending: bool) -> TimerView {
        let rules = self.rules();
        let progress = match (rules.advance, rules.initial_time) {
            (Advance::Cycle, _) => {
                remaining_fraction(self.time, effective_cycle(self.cycle_duration))
            }
            // Measured against the starting duration, full while above it
            (Advance::CountDown, InitialTime::Fixed(total)) => {
                remaining_fraction(self.time, total)
            }
            _ => None,
        };
        TimerView {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            time: self.time,
            display: format_record(self),
            is_running: self.is_running,
            background_color: self.background_color.clone(),
            decrement: self.decrement_guards(),
            reset_pending,
            progress,
        }
    }
}
