pub mod context;
pub mod serde_defaults;
pub mod storage;
pub mod timers;

// Re-exports for convenience
pub use context::{AppConfig, AppConfigExt, ConfigError};
pub use storage::{JsonFileStore, MemoryStore, STORAGE_KEY, Store, StoreError, StoredTimer};
pub use tabtimer_types::formatting;
pub use tabtimer_types::{DecrementGuards, TimerKind, TimerRecord, TimerView};
pub use timers::{RecordExt, Scheduler, TimerCollection, TimerError, TimerEvent};
