//! Tab persistence
//!
//! The collection is stored as one JSON array under a fixed key. The store is
//! an injected collaborator: `JsonFileStore` writes one file per key,
//! `MemoryStore` keeps the encoded JSON in process.

mod error;
mod json;
mod memory;

pub use error::StoreError;
pub use json::JsonFileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tabtimer_types::TimerRecord;

pub use tabtimer_types::DEFAULT_STORAGE_KEY as STORAGE_KEY;

/// Key-value access to the persisted tab list
pub trait Store {
    /// Stored tabs under `key`, `None` if nothing was ever written
    fn get(&self, key: &str) -> Result<Option<Vec<StoredTimer>>, StoreError>;

    /// Replace the tabs stored under `key`
    fn set(&mut self, key: &str, timers: &[TimerRecord]) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<StoredTimer>>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, timers: &[TimerRecord]) -> Result<(), StoreError> {
        (**self).set(key, timers)
    }
}

/// Lenient on-disk shape of a tab.
///
/// Every field is optional so data written by older versions (no `type`,
/// no `isRunning`, colors with a different alpha) still loads; the timer
/// model fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTimer {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub is_running: Option<bool>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub target_date_time: Option<String>,
    #[serde(default)]
    pub cycle_duration: Option<i64>,
}

/// Decode a JSON tab list.
///
/// Only a payload that isn't a JSON array fails. Entries with ill-typed
/// fields are skipped with a warning so one bad tab can't hide the others.
pub fn decode(key: &str, json: &str) -> Result<Vec<StoredTimer>, StoreError> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })?;

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(stored) => Some(stored),
            Err(err) => {
                tracing::warn!(key, index, error = %err, "Skipping unreadable stored timer");
                None
            }
        })
        .collect())
}

/// Encode a tab list as JSON
pub fn encode(key: &str, timers: &[TimerRecord]) -> Result<String, StoreError> {
    serde_json::to_string_pretty(timers).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

/// Default store directory: `~/.local/share/tabtimer` (or platform equivalent)
pub fn default_store_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tabtimer")
}
