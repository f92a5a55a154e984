//! File-backed store: one pretty-printed JSON file per key

use std::path::{Path, PathBuf};

use tabtimer_types::TimerRecord;

use super::{Store, StoreError, StoredTimer, decode, encode};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the tabs for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<StoredTimer>>, StoreError> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }
        decode(key, &content).map(Some)
    }

    fn set(&mut self, key: &str, timers: &[TimerRecord]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let json = encode(key, timers)?;

        // Write next to the target, then rename, so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Write { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabtimer_types::TimerKind;

    fn record(id: u64) -> TimerRecord {
        TimerRecord {
            id,
            name: format!("tab {}", id),
            kind: TimerKind::CountdownTimer,
            time: 600,
            is_running: false,
            background_color: "rgba(139, 0, 0, 0.4)".to_string(),
            target_date_time: None,
            cycle_duration: None,
        }
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.get("tabtimer-tabs").unwrap().is_none());
    }

    #[test]
    fn writes_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("nested")).unwrap();
        store.set("tabs", &[record(1), record(2)]).unwrap();

        let stored = store.get("tabs").unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].id, Some(2));
        assert_eq!(stored[1].kind.as_deref(), Some("timer"));
        assert!(!store.path_for("tabs").with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        std::fs::write(store.path_for("tabs"), "[{").unwrap();
        assert!(matches!(
            store.get("tabs"),
            Err(StoreError::Decode { .. })
        ));
    }
}
