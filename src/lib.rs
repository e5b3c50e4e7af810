//! # Acctscope - Account Lookup Service
//!
//! Searches account names and resolves account records from a single
//! externally managed table whose column layout is not fixed.
//!
//! Acctscope provides:
//! - Substring search over account names (case-insensitive, capped)
//! - Schema-adaptive record lookup across known column layouts
//! - Owner normalization for service-account placeholders
//! - A deep health check against the configured table
//! - An HTTP gateway and a CLI over the same core

pub mod account;
pub mod config;
pub mod layout;
pub mod output;
pub mod query;
pub mod server;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use account::AccountRecord;
pub use config::Settings;
pub use layout::{ColumnLayout, LAYOUTS};
pub use query::{Lookup, Resolver};
pub use storage::{AccountStore, StorageErrorKind};

/// Result type alias for Acctscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Acctscope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}
