//! Deferred cyclic-timer resets
//!
//! The scheduler owns every pending reset, keyed by timer id. It doesn't run
//! anything by itself: the driver asks for the next deadline, sleeps until
//! then, and collects the due ids with [`Scheduler::take_due`].
//!
//! Rules:
//! - at most one pending reset per id; scheduling again keeps the original
//! - cancellation happens on stop, delete, restart and collection reload
//! - a stopped scheduler holds nothing and accepts nothing

use chrono::{DateTime, Duration, Utc};
use hashbrown::HashMap;

#[derive(Debug)]
pub struct Scheduler {
    grace: Duration,
    running: bool,
    pending: HashMap<u64, DateTime<Utc>>,
}

impl Scheduler {
    /// Create a stopped scheduler with the given reset delay.
    ///
    /// A delay too large to represent is capped at the largest `Duration`.
    pub fn new(grace_secs: u64) -> Self {
        let grace = i64::try_from(grace_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            grace,
            running: false,
            pending: HashMap::new(),
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop and drop every pending reset
    pub fn stop(&mut self) {
        let dropped = self.cancel_all();
        self.running = false;
        if dropped > 0 {
            tracing::debug!(dropped, "Scheduler stopped with pending resets");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Schedule a reset for `id` one grace window after `now`.
    ///
    /// Returns false if one is already pending (it is kept as-is) or the
    /// scheduler is stopped.
    pub fn schedule_reset(&mut self, id: u64, now: DateTime<Utc>) -> bool {
        if !self.running || self.pending.contains_key(&id) {
            return false;
        }
        let deadline = now
            .checked_add_signed(self.grace)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.pending.insert(id, deadline);
        true
    }

    /// Cancel the pending reset for `id`, if any
    pub fn cancel(&mut self, id: u64) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.values().min().copied()
    }

    /// Remove and return every id whose deadline has passed, earliest first
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<u64> {
        let mut due: Vec<(DateTime<Utc>, u64)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        due.sort();

        for (_, id) in &due {
            self.pending.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(grace: u64) -> Scheduler {
        let mut scheduler = Scheduler::new(grace);
        scheduler.start();
        scheduler
    }

    #[test]
    fn one_pending_reset_per_id() {
        let now = Utc::now();
        let mut scheduler = running(10);
        assert!(scheduler.schedule_reset(1, now));
        assert!(!scheduler.schedule_reset(1, now + Duration::seconds(5)));
        assert_eq!(scheduler.next_deadline(), Some(now + Duration::seconds(10)));
    }

    #[test]
    fn due_ids_come_out_in_deadline_order() {
        let now = Utc::now();
        let mut scheduler = running(10);
        scheduler.schedule_reset(2, now + Duration::seconds(1));
        scheduler.schedule_reset(1, now);
        scheduler.schedule_reset(3, now + Duration::seconds(30));

        assert!(scheduler.take_due(now + Duration::seconds(9)).is_empty());
        assert_eq!(scheduler.take_due(now + Duration::seconds(11)), vec![1, 2]);
        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.is_pending(3));
    }

    #[test]
    fn cancel_removes_pending() {
        let now = Utc::now();
        let mut scheduler = running(10);
        scheduler.schedule_reset(1, now);
        assert!(scheduler.cancel(1));
        assert!(!scheduler.cancel(1));
        assert!(scheduler.take_due(now + Duration::seconds(60)).is_empty());
    }

    #[test]
    fn huge_grace_is_capped_instead_of_overflowing() {
        let now = Utc::now();
        let mut scheduler = running(u64::MAX);
        assert_eq!(scheduler.grace(), Duration::MAX);
        assert!(scheduler.schedule_reset(1, now));
        assert_eq!(scheduler.next_deadline(), Some(DateTime::<Utc>::MAX_UTC));
        assert!(scheduler.take_due(now).is_empty());
    }

    #[test]
    fn stopped_scheduler_is_empty_and_refuses_work() {
        let now = Utc::now();
        let mut scheduler = running(10);
        scheduler.schedule_reset(1, now);
        scheduler.stop();
        assert_eq!(scheduler.pending_count(), 0);
        assert!(!scheduler.is_running());
        assert!(!scheduler.schedule_reset(2, now));
    }
}
