//! Timer collection manager
//!
//! Owns the ordered tab list, the reset scheduler and the store. Every
//! operation is applied to the in-memory list first; if the list changed,
//! the whole list is written back exactly once. Store failures are logged
//! and never undo the in-memory change.

use chrono::{DateTime, Duration, Utc};
use tabtimer_types::{TimerRecord, TimerView};

use crate::storage::Store;

use super::TimerError;
use super::color::normalize_color;
use super::engine::{self, TimerEvent};
use super::kind::{Advance, effective_cycle};
use super::record::{self, RecordExt, TimerOverrides, initial_time};
use super::scheduler::Scheduler;
use super::target::{format_target, parse_target, remaining_for, seconds_until};

pub struct TimerCollection<S: Store> {
    store: S,
    key: String,
    timers: Vec<TimerRecord>,
    scheduler: Scheduler,
    /// Timer whose details panel is open
    active: Option<u64>,
    last_id: u64,
    /// Finishes caused by user actions, drained by the driver
    events: Vec<TimerEvent>,
}

impl<S: Store> TimerCollection<S> {
    /// Create an empty collection; call [`load`](Self::load) to read the store.
    pub fn new(store: S, key: impl Into<String>, grace_secs: u64) -> Self {
        let mut scheduler = Scheduler::new(grace_secs);
        scheduler.start();
        Self {
            store,
            key: key.into(),
            timers: Vec::new(),
            scheduler,
            active: None,
            last_id: 0,
            events: Vec::new(),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn timers(&self) -> &[TimerRecord] {
        &self.timers
    }

    pub fn get(&self, id: u64) -> Option<&TimerRecord> {
        self.timers.iter().find(|t| t.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_reset_pending(&self, id: u64) -> bool {
        self.scheduler.is_pending(id)
    }

    /// When the driver should next call [`run_due_resets`](Self::run_due_resets)
    pub fn next_reset_deadline(&self) -> Option<DateTime<Utc>> {
        self.scheduler.next_deadline()
    }

    /// Snapshots for rendering, in display order
    pub fn views(&self) -> Vec<TimerView> {
        self.timers
            .iter()
            .map(|t| t.view(self.scheduler.is_pending(t.id)))
            .collect()
    }

    // ─── Loading ────────────────────────────────────────────────────────────

    /// Replace the collection with what the store holds.
    ///
    /// Pending resets belong to the old collection and are cancelled first.
    /// A read failure keeps the current in-memory list.
    pub fn load(&mut self, now: DateTime<Utc>) -> &[TimerRecord] {
        let cancelled = self.scheduler.cancel_all();
        if cancelled > 0 {
            tracing::debug!(cancelled, "Cancelled pending resets before reload");
        }

        let stored = match self.store.get(&self.key) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "Failed to read timers, keeping current state");
                return &self.timers;
            }
        };

        let mut timers = Vec::with_capacity(stored.len());
        for (index, entry) in stored.into_iter().enumerate() {
            let fallback_id = match entry.id {
                Some(id) => id,
                None => self.next_id(now),
            };
            match record::from_stored(entry, fallback_id, now) {
                Ok(timer) if timers.iter().any(|t: &TimerRecord| t.id == timer.id) => {
                    tracing::warn!(index, id = timer.id, "Duplicate timer id, assigning a new one");
                    let fresh = self.next_id(now);
                    timers.push(TimerRecord { id: fresh, ..timer });
                }
                Ok(timer) => timers.push(timer),
                Err(err) => {
                    tracing::warn!(index, error = %err, "Skipping stored timer");
                }
            }
        }

        // A pending reset does not survive a restart, so restore the cycle now
        for timer in timers.iter_mut() {
            if timer.rules().advance == Advance::Cycle && timer.is_running && timer.time == 0 {
                *timer = timer.clone().with_time(effective_cycle(timer.cycle_duration));
            }
        }

        self.last_id = timers.iter().map(|t| t.id).max().unwrap_or(0).max(self.last_id);
        if self.active.is_some_and(|id| !timers.iter().any(|t| t.id == id)) {
            self.active = None;
        }
        self.timers = timers;
        tracing::info!(count = self.timers.len(), "Timers loaded");
        &self.timers
    }

    // ─── Tick Driver Entry Points ───────────────────────────────────────────

    /// Advance every running timer by one tick, persisting only on change
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<TimerEvent> {
        let report = engine::tick(&mut self.timers, &mut self.scheduler, now);
        if report.changed {
            self.persist();
        }
        report.events
    }

    /// Apply every cyclic reset whose grace window has elapsed
    pub fn run_due_resets(&mut self, now: DateTime<Utc>) -> Vec<TimerEvent> {
        let events: Vec<TimerEvent> = self
            .scheduler
            .take_due(now)
            .into_iter()
            .filter_map(|id| engine::apply_cycle_reset(&mut self.timers, id))
            .collect();
        if !events.is_empty() {
            self.persist();
        }
        events
    }

    /// Events raised by user actions since the last call
    pub fn take_events(&mut self) -> Vec<TimerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Cancel all pending resets and stop accepting new ones
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        tracing::info!("Timer collection shut down");
    }

    // ─── UI Actions ─────────────────────────────────────────────────────────

    /// Append a new timer of the given kind tag
    pub fn add(&mut self, kind: &str, now: DateTime<Utc>) -> Result<&TimerRecord, TimerError> {
        let id = self.next_id(now);
        let timer = record::create(kind, id, TimerOverrides::default(), now)?;
        tracing::info!(id, kind = %timer.kind, "Timer added");
        self.timers.push(timer);
        self.persist();
        Ok(&self.timers[self.timers.len() - 1])
    }

    /// Start or stop a timer
    pub fn toggle_running(&mut self, id: u64, now: DateTime<Utc>) -> bool {
        let Some(timer) = self.get(id).cloned() else {
            return false;
        };
        let is_running = !timer.is_running;

        // Restarting or stopping a cycle invalidates any pending reset
        if self.scheduler.cancel(id) {
            tracing::debug!(id, "Cancelled pending reset on toggle");
        }

        let updated = match timer.rules().advance {
            Advance::Cycle if is_running && timer.time == 0 => {
                let cycle = effective_cycle(timer.cycle_duration);
                timer.with_time(cycle).with_running(true)
            }
            Advance::FromTarget if is_running => {
                let time = remaining_for(timer.target_date_time.as_deref(), now).unwrap_or(0);
                timer.with_time(time).with_running(time > 0)
            }
            _ => timer.with_running(is_running),
        };

        tracing::debug!(id, is_running = updated.is_running, "Timer toggled");
        self.replace(updated)
    }

    pub fn rename(&mut self, id: u64, name: &str) -> bool {
        self.update(id, |timer| timer.with_name(name.to_string()))
    }

    /// Set a new background color (any CSS color the model can parse)
    pub fn recolor(&mut self, id: u64, color: &str) -> bool {
        let color = normalize_color(color);
        self.update(id, |timer| timer.with_background(color))
    }

    /// Point a target-date countdown at a new instant and recompute it now.
    ///
    /// An unparseable target is kept as entered and the timer is treated as
    /// elapsed.
    pub fn retarget(&mut self, id: u64, target: &str, now: DateTime<Utc>) -> bool {
        let Some(timer) = self.get(id).cloned() else {
            return false;
        };
        if !timer.rules().has_target {
            tracing::warn!(id, kind = %timer.kind, "Retarget ignored for non target-date timer");
            return false;
        }
        let was_running = timer.is_running;

        let updated = match parse_target(target) {
            Ok(instant) => {
                let time = seconds_until(instant, now);
                timer
                    .with_target(format_target(instant))
                    .with_time(time)
                    .with_running(time > 0)
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "Target date unreadable, treating as elapsed");
                timer
                    .with_target(target.to_string())
                    .with_time(0)
                    .with_running(false)
            }
        };
        self.replace_manual(was_running, updated)
    }

    /// Change a cyclic timer's period; the current cycle restarts at the new length
    pub fn set_cycle_duration(&mut self, id: u64, secs: u64) -> bool {
        let Some(timer) = self.get(id).cloned() else {
            return false;
        };
        if !timer.rules().has_cycle || secs == 0 {
            tracing::warn!(id, secs, kind = %timer.kind, "Cycle duration ignored");
            return false;
        }

        self.scheduler.cancel(id);
        self.replace(timer.with_cycle_duration(secs).with_time(secs))
    }

    /// Add `delta` seconds (negative to subtract), clamped at zero.
    ///
    /// Target-date countdowns move their target by the same amount.
    pub fn adjust_time(&mut self, id: u64, delta: i64, now: DateTime<Utc>) -> bool {
        let Some(timer) = self.get(id).cloned() else {
            return false;
        };
        let was_running = timer.is_running;

        let updated = if timer.rules().advance == Advance::FromTarget {
            let Some(target) = timer.target_date_time.as_deref().and_then(|t| parse_target(t).ok())
            else {
                tracing::warn!(id, "Cannot adjust a timer without a readable target");
                return false;
            };
            let Some(moved) = Duration::try_seconds(delta)
                .and_then(|delta| target.checked_add_signed(delta))
            else {
                tracing::warn!(id, delta, "Adjustment moves the target out of range, ignored");
                return false;
            };
            timer
                .with_target(format_target(moved))
                .with_time(seconds_until(moved, now))
        } else {
            let time = if delta.is_negative() {
                timer.time.saturating_sub(delta.unsigned_abs())
            } else {
                timer.time.saturating_add(delta as u64)
            };
            timer.with_time(time)
        };

        let updated = engine::settle(updated, &mut self.scheduler, now);
        self.replace_manual(was_running, updated)
    }

    /// Return a timer to the time it starts from: zero, the countdown default,
    /// the time left until its target, or its cycle duration
    pub fn reset_time(&mut self, id: u64, now: DateTime<Utc>) -> bool {
        let Some(timer) = self.get(id).cloned() else {
            return false;
        };
        self.scheduler.cancel(id);
        let was_running = timer.is_running;

        let time = initial_time(&timer, now);
        let updated = engine::settle(timer.with_time(time), &mut self.scheduler, now);
        self.replace_manual(was_running, updated)
    }

    /// Delete a timer, its pending reset and any details selection on it
    pub fn remove(&mut self, id: u64) -> bool {
        let Some(index) = self.timers.iter().position(|t| t.id == id) else {
            return false;
        };

        // Cancel before the record goes away so no reset can target it
        self.scheduler.cancel(id);
        self.timers.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }

        tracing::info!(id, "Timer removed");
        self.persist();
        true
    }

    /// Move the timer at `from` to position `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.timers.len();
        if from == to || from >= len || to >= len {
            if from >= len || to >= len {
                tracing::warn!(from, to, len, "Reorder out of bounds ignored");
            }
            return false;
        }

        let timer = self.timers.remove(from);
        self.timers.insert(to, timer);
        self.persist();
        true
    }

    // ─── Details Selection ──────────────────────────────────────────────────

    pub fn open_details(&mut self, id: u64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn close_details(&mut self) {
        self.active = None;
    }

    pub fn active_id(&self) -> Option<u64> {
        self.active
    }

    /// The timer whose details panel is open, as it is now
    pub fn details(&self) -> Option<&TimerRecord> {
        self.active.and_then(|id| self.get(id))
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    /// Unique id derived from the creation time in milliseconds
    fn next_id(&mut self, now: DateTime<Utc>) -> u64 {
        let millis = now.timestamp_millis().max(0) as u64;
        let mut id = millis.max(self.last_id + 1);
        while self.timers.iter().any(|t| t.id == id) {
            id += 1;
        }
        self.last_id = id;
        id
    }

    fn update(&mut self, id: u64, f: impl FnOnce(TimerRecord) -> TimerRecord) -> bool {
        match self.get(id).cloned() {
            Some(timer) => self.replace(f(timer)),
            None => false,
        }
    }

    /// Swap in an updated record; persists and returns true if anything changed
    fn replace(&mut self, updated: TimerRecord) -> bool {
        let Some(slot) = self.timers.iter_mut().find(|t| t.id == updated.id) else {
            return false;
        };
        if *slot == updated {
            return false;
        }
        *slot = updated;
        self.persist();
        true
    }

    /// Like [`replace`](Self::replace), but a running timer that the change
    /// stopped at zero is reported as finished, same as on a tick
    fn replace_manual(&mut self, was_running: bool, updated: TimerRecord) -> bool {
        let id = updated.id;
        let finished = was_running
            && !updated.is_running
            && updated.time == 0
            && updated.rules().stops_at_zero;
        let changed = self.replace(updated);
        if changed && finished {
            tracing::info!(id, "Timer finished");
            self.events.push(TimerEvent::Finished { id });
        }
        changed
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.set(&self.key, &self.timers) {
            tracing::warn!(key = %self.key, error = %err, "Failed to save timers, continuing in memory");
        }
    }
}

impl<S: Store> Drop for TimerCollection<S> {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}
