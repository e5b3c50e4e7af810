//! Deep health check: connectivity plus a row count of the accounts table.
//!
//! Failures are folded into the report, never returned as errors.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::storage::AccountStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub ok: bool,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    /// Report for a check that could not run to completion
    pub fn unhealthy(table: &str, error: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            table: table.to_string(),
            rows: None,
            db: None,
            error: Some(error.to_string()),
        }
    }
}

/// Open storage with `open`, ping it and count rows in `table`.
pub fn check_health<F>(table: &str, open: F) -> HealthReport
where
    F: FnOnce() -> Result<AccountStore>,
{
    let checked = open().and_then(|store| {
        store.ping()?;
        store.count_rows()
    });

    match checked {
        Ok(rows) => HealthReport {
            ok: true,
            table: table.to_string(),
            rows: Some(rows),
            db: Some("ok".to_string()),
            error: None,
        },
        Err(err) => {
            tracing::error!("health check failed for table '{}': {}", table, err);
            HealthReport::unhealthy(table, err)
        }
    }
}
