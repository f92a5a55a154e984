//! Timer service - drives the collection from a single event loop
//!
//! Architecture:
//! - ServiceHandle: clonable sender used by the UI layer
//! - TimerService: owns the collection and runs one `select!` loop over the
//!   tick interval, the earliest pending reset and incoming commands
//! - ServiceEvent: notifications for the sound/notification layer
//!
//! Everything touching the collection runs on the loop task, so ticks,
//! resets and user actions never interleave.
mod handler;

pub use handler::ServiceHandle;

use std::time::Duration;

use tabtimer_core::{AppConfig, AppConfigExt, Store, TimerCollection, TimerEvent};
use tabtimer_types::{TimerRecord, TimerView};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;

// ─────────────────────────────────────────────────────────────────────────────
// Service Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Messages sent to the service from the UI layer
#[derive(Debug)]
pub enum ServiceCommand {
    Add {
        kind: String,
        reply: oneshot::Sender<Result<u64, String>>,
    },
    ToggleRunning(u64),
    Rename { id: u64, name: String },
    Recolor { id: u64, color: String },
    Retarget { id: u64, target: String },
    SetCycleDuration { id: u64, secs: u64 },
    AdjustTime { id: u64, delta: i64 },
    ResetTime(u64),
    Remove(u64),
    Reorder { from: usize, to: usize },
    OpenDetails(u64),
    CloseDetails,
    Snapshot(oneshot::Sender<Vec<TimerView>>),
    Details(oneshot::Sender<Option<TimerRecord>>),
    Reload,
    Shutdown,
}

/// Notifications sent out of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    Loaded { count: usize },
    Timer(TimerEvent),
}

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 64;

// ─────────────────────────────────────────────────────────────────────────────
// Timer Service
// ─────────────────────────────────────────────────────────────────────────────

pub struct TimerService<S: Store, C: Clock> {
    collection: TimerCollection<S>,
    clock: C,
    tick_interval: Duration,
    cmd_rx: mpsc::Receiver<ServiceCommand>,
    event_tx: mpsc::Sender<ServiceEvent>,
}

impl<S, C> TimerService<S, C>
where
    S: Store + Send + 'static,
    C: Clock,
{
    /// Create the service, a handle to drive it and the event stream
    pub fn new(
        config: &AppConfig,
        store: S,
        clock: C,
    ) -> (Self, ServiceHandle, mpsc::Receiver<ServiceEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);

        let collection = TimerCollection::new(
            store,
            config.storage_key.clone(),
            config.cyclic_reset_grace_secs,
        );

        let service = Self {
            collection,
            clock,
            tick_interval: config.tick_interval(),
            cmd_rx,
            event_tx,
        };

        (service, ServiceHandle::new(cmd_tx), event_rx)
    }

    /// Run the event loop until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        self.load();

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            let reset_delay = self.reset_delay();

            tokio::select! {
                biased;

                _ = ticker.tick() => {
                    let events = self.collection.tick(self.clock.now());
                    self.emit_all(events);
                }
                _ = tokio::time::sleep(reset_delay.unwrap_or_default()), if reset_delay.is_some() => {
                    let events = self.collection.run_due_resets(self.clock.now());
                    self.emit_all(events);
                }
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(ServiceCommand::Shutdown) | None => break,
                    Some(cmd) => {
                        self.handle(cmd);
                        let events = self.collection.take_events();
                        self.emit_all(events);
                    }
                },
            }
        }

        self.collection.shutdown();
        tracing::info!("Timer service stopped");
    }

    fn load(&mut self) {
        let count = self.collection.load(self.clock.now()).len();
        self.emit(ServiceEvent::Loaded { count });
    }

    /// Time until the earliest pending reset, zero if already due
    fn reset_delay(&self) -> Option<Duration> {
        let deadline = self.collection.next_reset_deadline()?;
        Some((deadline - self.clock.now()).to_std().unwrap_or(Duration::ZERO))
    }

    fn handle(&mut self, cmd: ServiceCommand) {
        let now = self.clock.now();
        let timers = &mut self.collection;

        match cmd {
            ServiceCommand::Add { kind, reply } => {
                let result = timers
                    .add(&kind, now)
                    .map(|timer| timer.id)
                    .map_err(|e| e.to_string());
                if let Err(err) = &result {
                    tracing::warn!(kind = %kind, error = %err, "Add rejected");
                }
                let _ = reply.send(result);
            }
            ServiceCommand::ToggleRunning(id) => {
                timers.toggle_running(id, now);
            }
            ServiceCommand::Rename { id, name } => {
                timers.rename(id, &name);
            }
            ServiceCommand::Recolor { id, color } => {
                timers.recolor(id, &color);
            }
            ServiceCommand::Retarget { id, target } => {
                timers.retarget(id, &target, now);
            }
            ServiceCommand::SetCycleDuration { id, secs } => {
                timers.set_cycle_duration(id, secs);
            }
            ServiceCommand::AdjustTime { id, delta } => {
                timers.adjust_time(id, delta, now);
            }
            ServiceCommand::ResetTime(id) => {
                timers.reset_time(id, now);
            }
            ServiceCommand::Remove(id) => {
                timers.remove(id);
            }
            ServiceCommand::Reorder { from, to } => {
                timers.reorder(from, to);
            }
            ServiceCommand::OpenDetails(id) => {
                timers.open_details(id);
            }
            ServiceCommand::CloseDetails => timers.close_details(),
            ServiceCommand::Snapshot(reply) => {
                let _ = reply.send(timers.views());
            }
            ServiceCommand::Details(reply) => {
                let _ = reply.send(timers.details().cloned());
            }
            ServiceCommand::Reload => self.load(),
            // Handled by the loop
            ServiceCommand::Shutdown => {}
        }
    }

    fn emit_all(&self, events: Vec<TimerEvent>) {
        for event in events {
            self.emit(ServiceEvent::Timer(event));
        }
    }

    fn emit(&self, event: ServiceEvent) {
        if let Err(err) = self.event_tx.try_send(event) {
            tracing::debug!(error = %err, "Service event dropped");
        }
    }
}
