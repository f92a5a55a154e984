//! In-process store

use hashbrown::HashMap;
use tabtimer_types::TimerRecord;

use super::{Store, StoreError, StoredTimer, decode, encode};

/// Keeps encoded JSON per key, the same bytes a file store would write.
///
/// Failure injection lets callers exercise the best-effort paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key with raw JSON
    pub fn with_raw(mut self, key: &str, json: &str) -> Self {
        self.entries.insert(key.to_string(), json.to_string());
        self
    }

    /// Raw JSON currently stored under `key`
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<StoredTimer>>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable {
                reason: "reads disabled".to_string(),
            });
        }
        self.entries
            .get(key)
            .map(|json| decode(key, json))
            .transpose()
    }

    fn set(&mut self, key: &str, timers: &[TimerRecord]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable {
                reason: "writes disabled".to_string(),
            });
        }
        let json = encode(key, timers)?;
        self.entries.insert(key.to_string(), json);
        self.writes += 1;
        Ok(())
    }
}
