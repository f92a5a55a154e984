//! Error types for timer operations

use thiserror::Error;

/// Errors raised while creating or advancing timers.
///
/// None of these are fatal: the collection logs them and keeps its
/// in-memory state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("unknown timer type '{kind}'")]
    InvalidType { kind: String },

    #[error("unparseable color '{input}'")]
    MalformedColor { input: String },

    #[error("unparseable target date '{input}'")]
    MalformedDate { input: String },

    #[error("time of timer {id} would overflow")]
    TimeOverflow { id: u64 },
}
