//! SQL statements against the accounts table
//!
//! Table and column names are interpolated, never bound. Column names come
//! from the static layouts and the table name is validated at startup
//! (see `config::validate_table_name`). Identifiers stay unquoted:
//! SQLite treats an unresolvable double-quoted identifier as a string
//! literal, which would hide a missing column instead of reporting it.

use crate::layout::{ACCOUNT_NAME_COLUMN, ColumnLayout};

/// Maximum number of names a search returns.
pub const SEARCH_LIMIT: usize = 100;

/// Name of the case-insensitive substring function registered on every
/// connection (see `AccountStore::register_functions`).
pub const ICONTAINS_FN: &str = "acct_icontains";

/// Connectivity check.
pub const PING: &str = "SELECT 1";

/// Exact-match lookup projecting the record fields through `layout`.
pub fn select_by_name(table: &str, layout: &ColumnLayout) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ?1 LIMIT 1",
        layout.columns().join(", "),
        table,
        layout.account_name,
    )
}

/// Substring search on the canonical identifier column.
///
/// Names sort case-insensitively, with byte order breaking ties between
/// names that differ only in case.
pub fn search_names(table: &str) -> String {
    format!(
        "SELECT {col} FROM {table} WHERE {func}({col}, ?1) \
         ORDER BY {col} COLLATE NOCASE, {col} LIMIT ?2",
        col = ACCOUNT_NAME_COLUMN,
        table = table,
        func = ICONTAINS_FN,
    )
}

/// Row count for the health check.
pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", table)
}
