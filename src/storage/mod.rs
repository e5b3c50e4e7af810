//! Storage Layer - read-only SQLite access to the accounts table
//!
//! The table is owned by whatever loads it; this crate never writes to it.
//! Every operation opens its own read-only connection and drops it when
//! the operation returns.
//!
//! Failures are classified with [`StorageErrorKind`] so callers can tell a
//! column layout that does not exist apart from a storage that is broken.

pub mod schema;
pub mod sqlite;

pub use sqlite::AccountStore;

use crate::Error;

/// Coarse classification of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// The statement referenced a column the table does not have.
    SchemaMismatch,
    /// Anything else: unreadable file, missing table, locking, I/O.
    Other,
}

impl StorageErrorKind {
    /// Classify a driver error.
    pub fn classify(err: &rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => Self::from_message(msg),
            rusqlite::Error::SqlInputError { msg, .. } => Self::from_message(msg),
            _ => Self::Other,
        }
    }

    /// Classify a crate error; non-storage errors are always `Other`.
    pub fn of(err: &Error) -> Self {
        match err {
            Error::Storage(inner) => Self::classify(inner),
            _ => Self::Other,
        }
    }

    fn from_message(msg: &str) -> Self {
        if msg.starts_with("no such column") {
            Self::SchemaMismatch
        } else {
            Self::Other
        }
    }
}
