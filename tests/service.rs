use std::time::Duration;

use chrono::Utc;
use tabtimer::service::{ServiceEvent, ServiceHandle, TimerService};
use tabtimer::MonotonicClock;
use tabtimer_core::{AppConfig, MemoryStore, TimerEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

fn start(store: MemoryStore) -> (ServiceHandle, mpsc::Receiver<ServiceEvent>, JoinHandle<()>) {
    let config = AppConfig::default();
    let clock = MonotonicClock::starting_at(Utc::now());
    let (service, handle, events) = TimerService::new(&config, store, clock);
    (handle, events, tokio::spawn(service.run()))
}

fn drain(events: &mut mpsc::Receiver<ServiceEvent>) -> Vec<ServiceEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

async fn sleep_secs(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn stopwatch_counts_once_per_second() {
    let (handle, _events, task) = start(MemoryStore::new());

    let id = handle.add("stopwatch").await.unwrap();
    handle.toggle_running(id).await.unwrap();
    sleep_secs(3.5).await;

    let views = handle.snapshot().await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].time, 3);
    assert_eq!(views[0].display, "0:03");
    assert!(views[0].is_running);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cyclic_timer_rests_then_restarts() {
    let (handle, mut events, task) = start(MemoryStore::new());

    let id = handle.add("cyclic").await.unwrap();
    handle.set_cycle_duration(id, 5).await.unwrap();
    handle.toggle_running(id).await.unwrap();

    sleep_secs(5.5).await;
    let views = handle.snapshot().await.unwrap();
    assert_eq!(views[0].time, 0);
    assert!(views[0].reset_pending);
    assert!(views[0].is_running);

    // Still inside the grace window
    sleep_secs(8.0).await;
    assert_eq!(handle.snapshot().await.unwrap()[0].time, 0);

    sleep_secs(2.0).await;
    let views = handle.snapshot().await.unwrap();
    assert_eq!(views[0].time, 5);
    assert!(!views[0].reset_pending);

    let events = drain(&mut events);
    assert!(events.contains(&ServiceEvent::Timer(TimerEvent::CycleCompleted { id })));
    assert!(events.contains(&ServiceEvent::Timer(TimerEvent::CycleRestarted { id })));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stopping_during_grace_cancels_reset() {
    let (handle, mut events, task) = start(MemoryStore::new());

    let id = handle.add("cyclic").await.unwrap();
    handle.set_cycle_duration(id, 2).await.unwrap();
    handle.toggle_running(id).await.unwrap();
    sleep_secs(2.5).await;
    handle.toggle_running(id).await.unwrap();

    sleep_secs(20.0).await;
    let views = handle.snapshot().await.unwrap();
    assert_eq!(views[0].time, 0);
    assert!(!views[0].is_running);
    assert!(
        !drain(&mut events)
            .iter()
            .any(|e| matches!(e, ServiceEvent::Timer(TimerEvent::CycleRestarted { .. })))
    );

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn countdown_reports_finish() {
    let (handle, mut events, task) = start(MemoryStore::new());

    let id = handle.add("timer").await.unwrap();
    handle.adjust_time(id, -597).await.unwrap();
    handle.toggle_running(id).await.unwrap();
    sleep_secs(4.5).await;

    let views = handle.snapshot().await.unwrap();
    assert_eq!(views[0].time, 0);
    assert!(!views[0].is_running);
    assert!(drain(&mut events).contains(&ServiceEvent::Timer(TimerEvent::Finished { id })));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn loads_stored_tabs_on_start() {
    let store = MemoryStore::new().with_raw(
        "tabtimer-tabs",
        r#"[{"id": 7, "name": "Tea", "type": "timer", "time": 90, "isRunning": false,
             "backgroundColor": "rgba(0, 0, 139, 0.4)"}]"#,
    );
    let (handle, mut events, task) = start(store);

    let views = handle.snapshot().await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].name, "Tea");
    assert_eq!(views[0].display, "1:30");
    assert_eq!(drain(&mut events), vec![ServiceEvent::Loaded { count: 1 }]);

    handle.open_details(7).await.unwrap();
    assert_eq!(handle.details().await.unwrap().map(|t| t.id), Some(7));
    handle.close_details().await.unwrap();
    assert_eq!(handle.details().await.unwrap(), None);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unknown_kind_is_reported_to_caller() {
    let (handle, _events, task) = start(MemoryStore::new());

    assert!(handle.add("alarm").await.is_err());
    assert!(handle.snapshot().await.unwrap().is_empty());

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn handle_errors_after_shutdown() {
    let (handle, _events, task) = start(MemoryStore::new());

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert!(handle.snapshot().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn retarget_into_the_past_reports_finish() {
    let (handle, mut events, task) = start(MemoryStore::new());

    let id = handle.add("targetDate").await.unwrap();
    handle.retarget(id, "2000-01-01T00:00:00Z").await.unwrap();

    let views = handle.snapshot().await.unwrap();
    assert_eq!(views[0].time, 0);
    assert!(!views[0].is_running);
    assert!(drain(&mut events).contains(&ServiceEvent::Timer(TimerEvent::Finished { id })));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}
