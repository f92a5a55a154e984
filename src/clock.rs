//! Wall-clock sources for the service loop.

use chrono::{DateTime, Utc};

pub trait Clock: Send + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall time derived from tokio's clock.
///
/// Starts at a fixed instant and moves with `tokio::time`, so it follows
/// paused and advanced time in tests.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: DateTime<Utc>,
    started: tokio::time::Instant,
}

impl MonotonicClock {
    pub fn starting_at(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.started.elapsed();
        chrono::Duration::from_std(elapsed)
            .map(|d| self.epoch + d)
            .unwrap_or(self.epoch)
    }
}
