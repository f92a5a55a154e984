use tabtimer_types::{TimerRecord, TimerView};
use tokio::sync::{mpsc, oneshot};

use super::ServiceCommand;

// ─────────────────────────────────────────────────────────────────────────────
// Service Handle (for the UI layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to send user actions to the timer service and query its state
#[derive(Clone)]
pub struct ServiceHandle {
    cmd_tx: mpsc::Sender<ServiceCommand>,
}

impl ServiceHandle {
    pub(super) fn new(cmd_tx: mpsc::Sender<ServiceCommand>) -> Self {
        Self { cmd_tx }
    }

    async fn send(&self, cmd: ServiceCommand) -> Result<(), String> {
        self.cmd_tx.send(cmd).await.map_err(|e| e.to_string())
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ServiceCommand,
    ) -> Result<T, String> {
        let (tx, rx) = oneshot::channel();
        self.send(make(tx)).await?;
        rx.await.map_err(|e| e.to_string())
    }

    /// Add a timer by kind tag ("stopwatch", "timer", "targetDate", "cyclic")
    pub async fn add(&self, kind: &str) -> Result<u64, String> {
        let kind = kind.to_string();
        self.request(|reply| ServiceCommand::Add { kind, reply }).await?
    }

    pub async fn toggle_running(&self, id: u64) -> Result<(), String> {
        self.send(ServiceCommand::ToggleRunning(id)).await
    }

    pub async fn rename(&self, id: u64, name: impl Into<String>) -> Result<(), String> {
        self.send(ServiceCommand::Rename {
            id,
            name: name.into(),
        })
        .await
    }

    pub async fn recolor(&self, id: u64, color: impl Into<String>) -> Result<(), String> {
        self.send(ServiceCommand::Recolor {
            id,
            color: color.into(),
        })
        .await
    }

    /// Set a new target date (RFC 3339 or `YYYY-MM-DDTHH:MM[:SS]` local time)
    pub async fn retarget(&self, id: u64, target: impl Into<String>) -> Result<(), String> {
        self.send(ServiceCommand::Retarget {
            id,
            target: target.into(),
        })
        .await
    }

    pub async fn set_cycle_duration(&self, id: u64, secs: u64) -> Result<(), String> {
        self.send(ServiceCommand::SetCycleDuration { id, secs }).await
    }

    /// Shift a timer by `delta` seconds (negative to decrement)
    pub async fn adjust_time(&self, id: u64, delta: i64) -> Result<(), String> {
        self.send(ServiceCommand::AdjustTime { id, delta }).await
    }

    pub async fn reset_time(&self, id: u64) -> Result<(), String> {
        self.send(ServiceCommand::ResetTime(id)).await
    }

    pub async fn remove(&self, id: u64) -> Result<(), String> {
        self.send(ServiceCommand::Remove(id)).await
    }

    /// Move the tab at position `from` to position `to`
    pub async fn reorder(&self, from: usize, to: usize) -> Result<(), String> {
        self.send(ServiceCommand::Reorder { from, to }).await
    }

    pub async fn open_details(&self, id: u64) -> Result<(), String> {
        self.send(ServiceCommand::OpenDetails(id)).await
    }

    pub async fn close_details(&self) -> Result<(), String> {
        self.send(ServiceCommand::CloseDetails).await
    }

    /// Render-ready view of every tab, in order
    pub async fn snapshot(&self) -> Result<Vec<TimerView>, String> {
        self.request(ServiceCommand::Snapshot).await
    }

    /// Record shown in the details panel, if open
    pub async fn details(&self) -> Result<Option<TimerRecord>, String> {
        self.request(ServiceCommand::Details).await
    }

    /// Re-read the store, dropping every pending reset
    pub async fn reload(&self) -> Result<(), String> {
        self.send(ServiceCommand::Reload).await
    }

    pub async fn shutdown(&self) -> Result<(), String> {
        self.send(ServiceCommand::Shutdown).await
    }
}
