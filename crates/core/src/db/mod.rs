//! Index store: the SQLite database holding projects, sources, symbols, and
//! the window index, plus the error taxonomy every read/write path reports.
//!
//! Layout:
//! - `config`: database path, blob root, hash seed, window width.
//! - `models`: record and metadata value types.
//! - `slug`: random external identifiers.
//! - `store`: the `IndexDb` connection wrapper, schema migrations, and all
//!   queries.

pub mod config;
pub mod models;
pub mod slug;
pub mod store;

pub use config::IndexConfig;
pub use models::{
    Anchor, FullMatches, IndexCounts, ProjectRecord, SourceFull, SourceMeta, SourceReceipt,
    SymbolFull, SymbolMeta, VersionRecord,
};
pub use store::IndexDb;

use std::path::PathBuf;

use thiserror::Error;

/// Error taxonomy for the index store and the services built on it.
///
/// Read paths surface these unchanged; ingestion is all-or-nothing; the
/// submatch service never reports partial results.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Slug or id unknown.
    #[error("not found: {0}")]
    NotFound(String),

    /// A range whose start lies past its end.
    #[error("invalid range: start {start} is past end {end}")]
    InvalidRange { start: i64, end: i64 },

    /// A parameter outside its contract (negative page, zero page size, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unique-constraint violation on ingestion.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An invariant violation detected at runtime.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The disassembly blob behind a stored object is gone.
    #[error("backing blob missing at {}", .0.display())]
    BackingStoreMissing(PathBuf),

    /// The database (or blob storage) cannot be reached or operated on.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    /// The submatch anchor fan-out cap was exceeded.
    #[error("submatch fan-out exhausted: {anchors} anchors over cap {cap}")]
    ResourceExhausted { anchors: usize, cap: usize },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result alias used across the store and the services built on it.
pub type DbResult<T> = Result<T, StoreError>;

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message) => {
                let text = message.clone().unwrap_or_else(|| err.to_string());
                match failure.code {
                    rusqlite::ErrorCode::ConstraintViolation => {
                        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                            || failure.extended_code
                                == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        {
                            StoreError::Conflict(text)
                        } else {
                            StoreError::Integrity(text)
                        }
                    }
                    _ => StoreError::Unavailable(text),
                }
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// True when the error is a UNIQUE violation naming the given column, e.g.
/// `symbols.slug`. Used to tell slug collisions (retryable) apart from real
/// identity conflicts.
pub(crate) fn unique_failure_on(err: &rusqlite::Error, column: &str) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && message.contains(column)
    )
}
