use tabtimer::service::{ServiceEvent, TimerService};
use tabtimer::{SystemClock, logging};
use tabtimer_core::timers::TimerEvent;
use tabtimer_core::{AppConfig, AppConfigExt, JsonFileStore, MemoryStore, Store};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _log_guard = logging::init();

    let config = AppConfig::load();
    let store_dir = config.store_dir();
    let store: Box<dyn Store + Send> = match JsonFileStore::open(&store_dir) {
        Ok(store) => Box::new(store),
        Err(err) => {
            tracing::warn!(dir = ?store_dir, error = %err, "Storage unavailable, timers will not persist");
            Box::new(MemoryStore::new())
        }
    };

    let (service, handle, mut events) = TimerService::new(&config, store, SystemClock);
    let service_task = tokio::spawn(service.run());

    let notifier = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ServiceEvent::Timer(TimerEvent::Finished { id }) => {
                    tracing::info!(id, "Timer finished");
                }
                ServiceEvent::Timer(TimerEvent::CycleCompleted { id }) => {
                    tracing::info!(id, "Cycle completed");
                }
                ServiceEvent::Timer(TimerEvent::CycleRestarted { id }) => {
                    tracing::debug!(id, "Cycle restarted");
                }
                ServiceEvent::Loaded { count } => {
                    tracing::debug!(count, "Service ready");
                }
            }
        }
    });

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }

    if let Err(err) = handle.shutdown().await {
        tracing::warn!(error = %err, "Service already stopped");
    }
    if let Err(err) = service_task.await {
        tracing::error!(error = %err, "Timer service task failed");
    }
    notifier.abort();
}
