//! Error types for tab persistence

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading or writing the tab store.
///
/// Persistence is best effort: callers log these and keep running on the
/// in-memory collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write store file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode stored tabs under '{key}'")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode tabs for '{key}'")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create store directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}
