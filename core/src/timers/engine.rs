//! Tick engine
//!
//! Advances every running timer by one tick according to its kind, and
//! applies deferred cyclic resets when the scheduler reports them due.
//!
//! # Tick rules
//!
//! | kind         | per tick                                  | at zero                  |
//! |--------------|-------------------------------------------|--------------------------|
//! | stopwatch    | `time += 1`                               | n/a                      |
//! | countdown    | `time = max(0, time - 1)`                 | stops                    |
//! | target date  | `time = floor(target - now)`, clamped     | stops                    |
//! | cyclic       | `time = max(0, time - 1)`                 | reset after grace window |
//!
//! Records are independent of each other. A record whose update fails is
//! logged and left as it was for that tick.

use chrono::{DateTime, Utc};
use tabtimer_types::{TimerKind, TimerRecord};

use super::TimerError;
use super::kind::{Advance, effective_cycle};
use super::record::RecordExt;
use super::scheduler::Scheduler;
use super::target::remaining_for;

/// Notable transitions produced by ticks and resets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// A countdown or target-date timer reached zero and stopped
    Finished { id: u64 },
    /// A cyclic timer reached zero; its reset is now pending
    CycleCompleted { id: u64 },
    /// A pending reset restored a cyclic timer to its cycle duration
    CycleRestarted { id: u64 },
}

/// Outcome of one pass over the collection
#[derive(Debug, Default)]
pub struct TickReport {
    /// At least one record differs from before the tick
    pub changed: bool,
    pub events: Vec<TimerEvent>,
}

/// What happened to a single record on this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Finished,
    CycleCompleted,
}

/// Advance one running record by a single tick
pub fn advance(
    record: &TimerRecord,
    now: DateTime<Utc>,
) -> Result<(TimerRecord, Option<Milestone>), TimerError> {
    let rules = record.rules();

    let next_time = match rules.advance {
        Advance::CountUp => record
            .time
            .checked_add(1)
            .ok_or(TimerError::TimeOverflow { id: record.id })?,
        Advance::CountDown | Advance::Cycle => record.time.saturating_sub(1),
        Advance::FromTarget => match remaining_for(record.target_date_time.as_deref(), now) {
            Ok(secs) => secs,
            Err(err) => {
                tracing::warn!(id = record.id, error = %err, "Target date unreadable, treating as elapsed");
                0
            }
        },
    };

    let mut next = record.clone().with_time(next_time);
    let mut milestone = None;

    if next_time == 0 {
        if rules.stops_at_zero {
            next = next.with_running(false);
            milestone = Some(Milestone::Finished);
        } else if rules.advance == Advance::Cycle && record.time > 0 {
            milestone = Some(Milestone::CycleCompleted);
        }
    }

    Ok((next, milestone))
}

/// Run one tick over the whole collection
pub fn tick(
    timers: &mut [TimerRecord],
    scheduler: &mut Scheduler,
    now: DateTime<Utc>,
) -> TickReport {
    let mut report = TickReport::default();

    for slot in timers.iter_mut().filter(|t| t.is_running) {
        let (next, milestone) = match advance(slot, now) {
            Ok(advanced) => advanced,
            Err(err) => {
                tracing::error!(id = slot.id, kind = %slot.kind, error = %err, "Timer left unchanged this tick");
                continue;
            }
        };

        match milestone {
            Some(Milestone::Finished) => {
                tracing::info!(id = slot.id, kind = %slot.kind, "Timer finished");
                report.events.push(TimerEvent::Finished { id: slot.id });
            }
            Some(Milestone::CycleCompleted) => {
                if scheduler.schedule_reset(slot.id, now) {
                    tracing::debug!(id = slot.id, "Cycle completed, reset scheduled");
                }
                report.events.push(TimerEvent::CycleCompleted { id: slot.id });
            }
            None => {}
        }

        if next != *slot {
            *slot = next;
            report.changed = true;
        }
    }

    report
}

/// Apply a due cyclic reset.
///
/// The record is looked up again by id; a record that was deleted or
/// stopped in the meantime is left alone.
pub fn apply_cycle_reset(timers: &mut [TimerRecord], id: u64) -> Option<TimerEvent> {
    let slot = timers.iter_mut().find(|t| t.id == id)?;
    if slot.kind != TimerKind::CyclicTimer || !slot.is_running {
        tracing::debug!(id, "Dropping reset for stopped timer");
        return None;
    }

    let cycle = effective_cycle(slot.cycle_duration);
    *slot = slot.clone().with_time(cycle);
    tracing::info!(id, cycle, "Cyclic timer restarted");
    Some(TimerEvent::CycleRestarted { id })
}

/// Re-establish the zero invariants after a manual change to `time`.
///
/// Stopping kinds stop at zero; a running cyclic timer at zero gets a
/// pending reset, and one moved off zero loses it.
pub fn settle(record: TimerRecord, scheduler: &mut Scheduler, now: DateTime<Utc>) -> TimerRecord {
    let rules = record.rules();

    if rules.stops_at_zero && record.is_running && record.time == 0 {
        return record.with_running(false);
    }

    if rules.advance == Advance::Cycle {
        if record.time > 0 {
            scheduler.cancel(record.id);
        } else if record.is_running {
            scheduler.schedule_reset(record.id, now);
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::record::{TimerOverrides, build};
    use chrono::Duration;

    fn record(kind: TimerKind, time: u64, running: bool) -> TimerRecord {
        build(
            kind,
            1,
            TimerOverrides {
                time: Some(time),
                is_running: Some(running),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    fn scheduler() -> Scheduler {
        let mut scheduler = Scheduler::new(10);
        scheduler.start();
        scheduler
    }

    #[test]
    fn stopped_timers_do_not_move() {
        let now = Utc::now();
        let mut timers = vec![record(TimerKind::Stopwatch, 5, false)];
        let report = tick(&mut timers, &mut scheduler(), now);
        assert!(!report.changed);
        assert_eq!(timers[0].time, 5);
    }

    #[test]
    fn stopwatch_counts_up() {
        let now = Utc::now();
        let mut timers = vec![record(TimerKind::Stopwatch, 0, true)];
        let mut scheduler = scheduler();
        for _ in 0..42 {
            tick(&mut timers, &mut scheduler, now);
        }
        assert_eq!(timers[0].time, 42);
        assert!(timers[0].is_running);
    }

    #[test]
    fn stopwatch_overflow_is_isolated() {
        let now = Utc::now();
        let mut timers = vec![
            record(TimerKind::Stopwatch, u64::MAX, true),
            record(TimerKind::CountdownTimer, 3, true),
        ];
        let report = tick(&mut timers, &mut scheduler(), now);
        assert!(report.changed);
        assert_eq!(timers[0].time, u64::MAX);
        assert_eq!(timers[1].time, 2);
    }

    #[test]
    fn countdown_stops_once_at_zero() {
        let now = Utc::now();
        let mut timers = vec![record(TimerKind::CountdownTimer, 2, true)];
        let mut scheduler = scheduler();

        tick(&mut timers, &mut scheduler, now);
        let report = tick(&mut timers, &mut scheduler, now);
        assert_eq!(report.events, vec![TimerEvent::Finished { id: 1 }]);
        assert_eq!(timers[0].time, 0);
        assert!(!timers[0].is_running);

        let report = tick(&mut timers, &mut scheduler, now);
        assert!(!report.changed);
        assert!(report.events.is_empty());
        assert_eq!(timers[0].time, 0);
    }

    #[test]
    fn target_date_is_derived_from_wall_clock() {
        let now = Utc::now();
        let mut target = record(TimerKind::TargetDateCountdown, 0, true);
        target.target_date_time = Some((now + Duration::seconds(3600)).to_rfc3339());
        let mut timers = vec![target];
        let mut scheduler = scheduler();

        tick(&mut timers, &mut scheduler, now);
        assert!((3599..=3600).contains(&timers[0].time));

        // Clock jumps forward 20 minutes between ticks
        tick(&mut timers, &mut scheduler, now + Duration::seconds(1200));
        assert!((2399..=2400).contains(&timers[0].time));

        let report = tick(&mut timers, &mut scheduler, now + Duration::seconds(4000));
        assert_eq!(timers[0].time, 0);
        assert!(!timers[0].is_running);
        assert_eq!(report.events, vec![TimerEvent::Finished { id: 1 }]);
    }

    #[test]
    fn malformed_target_counts_as_elapsed() {
        let now = Utc::now();
        let mut target = record(TimerKind::TargetDateCountdown, 100, true);
        target.target_date_time = Some("someday".to_string());
        let mut timers = vec![target];

        tick(&mut timers, &mut scheduler(), now);
        assert_eq!(timers[0].time, 0);
        assert!(!timers[0].is_running);
    }

    #[test]
    fn cyclic_schedules_a_single_reset() {
        let now = Utc::now();
        let mut timers = vec![record(TimerKind::CyclicTimer, 1, true)];
        let mut scheduler = scheduler();

        let report = tick(&mut timers, &mut scheduler, now);
        assert_eq!(report.events, vec![TimerEvent::CycleCompleted { id: 1 }]);
        assert!(scheduler.is_pending(1));
        assert!(timers[0].is_running);

        // Sitting at zero is not another crossing
        let report = tick(&mut timers, &mut scheduler, now + Duration::seconds(1));
        assert!(report.events.is_empty());
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.next_deadline(), Some(now + Duration::seconds(10)));
    }

    #[test]
    fn reset_skips_stopped_and_missing_timers() {
        let mut timers = vec![record(TimerKind::CyclicTimer, 0, false)];
        timers[0].cycle_duration = Some(5);
        assert_eq!(apply_cycle_reset(&mut timers, 1), None);
        assert_eq!(apply_cycle_reset(&mut timers, 99), None);
        assert_eq!(timers[0].time, 0);

        timers[0].is_running = true;
        assert_eq!(
            apply_cycle_reset(&mut timers, 1),
            Some(TimerEvent::CycleRestarted { id: 1 })
        );
        assert_eq!(timers[0].time, 5);
    }

    #[test]
    fn settle_handles_manual_zero() {
        let now = Utc::now();
        let mut scheduler = scheduler();

        let countdown = settle(record(TimerKind::CountdownTimer, 0, true), &mut scheduler, now);
        assert!(!countdown.is_running);

        let cyclic = settle(record(TimerKind::CyclicTimer, 0, true), &mut scheduler, now);
        assert!(cyclic.is_running);
        assert!(scheduler.is_pending(1));

        settle(cyclic.with_time(30), &mut scheduler, now);
        assert!(!scheduler.is_pending(1));
    }
}
