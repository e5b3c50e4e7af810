//! SQLite storage implementation

use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use super::schema;
use crate::Result;
use crate::account::AccountRecord;
use crate::layout::ColumnLayout;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only handle on the accounts table.
///
/// Owns a single connection; drop the store to release it.
pub struct AccountStore {
    conn: Connection,
    table: String,
}

impl AccountStore {
    /// Open a database read-only. `target` is a file path or a `file:` URI.
    ///
    /// A missing file is an error rather than a fresh empty database.
    pub fn open(target: &str, table: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(target, flags)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::from_connection(conn, table)
    }

    /// Wrap an existing connection (used for in-memory databases in tests).
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        Self::register_functions(&conn)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Table this store reads from
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Unicode-aware case-insensitive "contains", used by search.
    fn register_functions(conn: &Connection) -> Result<()> {
        conn.create_scalar_function(
            schema::ICONTAINS_FN,
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let haystack = value_text(ctx.get_raw(0));
                let needle = value_text(ctx.get_raw(1));
                Ok(match (haystack, needle) {
                    (Some(h), Some(n)) => h.to_lowercase().contains(&n.to_lowercase()),
                    _ => false,
                })
            },
        )?;
        Ok(())
    }

    // ========== Health ==========

    /// Round-trip a trivial statement
    pub fn ping(&self) -> Result<()> {
        self.conn.query_row(schema::PING, [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Count rows in the accounts table
    pub fn count_rows(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(&schema::count_rows(&self.table), [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    // ========== Search ==========

    /// Account names containing `needle` (case-insensitive), ascending,
    /// at most `limit` of them. `needle` is matched literally.
    pub fn search_names(&self, needle: &str, limit: usize) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&schema::search_names(&self.table))?;
        let names = stmt
            .query_map(params![needle, limit as i64], |row| {
                Ok(value_text(row.get_ref(0)?).unwrap_or_default())
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    // ========== Lookup ==========

    /// Fetch one account by exact name, projecting through `layout`.
    ///
    /// The attempt runs in its own transaction. On failure the transaction
    /// is rolled back before the error is returned, so the connection is
    /// clean for the next attempt.
    pub fn fetch_with_layout(
        &mut self,
        layout: &ColumnLayout,
        name: &str,
    ) -> Result<Option<AccountRecord>> {
        let sql = schema::select_by_name(&self.table, layout);
        let tx = self.conn.transaction()?;
        let fetched = tx.query_row(&sql, [name], row_to_record).optional();

        match fetched {
            Ok(record) => {
                tx.commit()?;
                Ok(record)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!(
                        "rollback after failed '{}' attempt also failed: {}",
                        layout.name,
                        rollback_err
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Whether a transaction is open on this connection
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

/// Build a record from a row in layout column order.
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<AccountRecord> {
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(value_text(row.get_ref(idx)?).unwrap_or_default())
    };
    Ok(AccountRecord {
        name: text(0)?,
        owner: text(1)?,
        email: text(2)?,
        manager: text(3)?,
        pam: text(4)?,
    })
}

/// Render any SQLite value as text; NULL stays `None`.
fn value_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LEGACY, PURE, SHORT};
    use crate::storage::StorageErrorKind;
    use crate::storage::testing::{create_table, fixture_db, insert};

    fn record(name: &str) -> AccountRecord {
        AccountRecord::new(name, "J. Lee", "j@x.com", "M. Roe", "P. Kim")
    }

    fn memory_store(layout: &ColumnLayout, records: &[AccountRecord]) -> AccountStore {
        let conn = Connection::open_in_memory().unwrap();
        create_table(&conn, "accounts", layout);
        for r in records {
            insert(&conn, "accounts", layout, r);
        }
        AccountStore::from_connection(conn, "accounts").unwrap()
    }

    #[test]
    fn test_fetch_with_matching_layout() {
        let mut store = memory_store(&PURE, &[record("Acme")]);

        let found = store.fetch_with_layout(&PURE, "Acme").unwrap().unwrap();
        assert_eq!(found, record("Acme"));
        assert!(store.fetch_with_layout(&PURE, "Globex").unwrap().is_none());
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_fetch_with_wrong_layout_rolls_back() {
        let mut store = memory_store(&PURE, &[record("Acme")]);

        let err = store.fetch_with_layout(&SHORT, "Acme").unwrap_err();
        assert_eq!(StorageErrorKind::of(&err), StorageErrorKind::SchemaMismatch);
        assert!(!store.in_transaction());

        // The connection is still usable afterwards.
        assert!(store.fetch_with_layout(&PURE, "Acme").unwrap().is_some());
    }

    #[test]
    fn test_null_and_numeric_columns_become_text() {
        let conn = Connection::open_in_memory().unwrap();
        create_table(&conn, "accounts", &LEGACY);
        conn.execute(
            "INSERT INTO accounts (account_name, account_owner, owner_email, manager, account_pam) \
             VALUES ('Acme', NULL, NULL, 42, 'P. Kim')",
            [],
        )
        .unwrap();
        let mut store = AccountStore::from_connection(conn, "accounts").unwrap();

        let found = store.fetch_with_layout(&LEGACY, "Acme").unwrap().unwrap();
        assert_eq!(found, AccountRecord::new("Acme", "", "", "42", "P. Kim"));
    }

    #[test]
    fn test_search_names_case_insensitive_sorted() {
        let store = memory_store(
            &SHORT,
            &[
                record("globex"),
                record("Acme West"),
                record("ACME East"),
                record("Initech"),
            ],
        );

        let names = store.search_names("acme", 100).unwrap();
        assert_eq!(names, vec!["ACME East", "Acme West"]);
    }

    #[test]
    fn test_search_names_order_ignores_case() {
        let store = memory_store(
            &SHORT,
            &[
                record("Zeta Holdings"),
                record("acme holdings"),
                record("Beta Holdings"),
                record("ACME holdings"),
            ],
        );

        let names = store.search_names("holdings", 100).unwrap();
        assert_eq!(
            names,
            vec![
                "ACME holdings",
                "acme holdings",
                "Beta Holdings",
                "Zeta Holdings"
            ]
        );
    }

    #[test]
    fn test_search_names_unicode_and_literal_wildcards() {
        let store = memory_store(
            &SHORT,
            &[
                record("Ümlaut GmbH"),
                record("100% Pure"),
                record("1000 Pure"),
            ],
        );

        assert_eq!(store.search_names("üml", 100).unwrap(), vec!["Ümlaut GmbH"]);
        assert_eq!(store.search_names("0%", 100).unwrap(), vec!["100% Pure"]);
    }

    #[test]
    fn test_search_names_respects_limit() {
        let records: Vec<_> = (0..20).map(|i| record(&format!("Acct {:02}", i))).collect();
        let store = memory_store(&SHORT, &records);

        let names = store.search_names("acct", 5).unwrap();
        assert_eq!(
            names,
            vec!["Acct 00", "Acct 01", "Acct 02", "Acct 03", "Acct 04"]
        );
    }

    #[test]
    fn test_ping_and_count() {
        let store = memory_store(&SHORT, &[record("a"), record("b"), record("c")]);
        store.ping().unwrap();
        assert_eq!(store.count_rows().unwrap(), 3);
    }

    #[test]
    fn test_open_is_read_only() {
        let (_dir, path) = fixture_db(&SHORT, &[record("Acme")]);
        let target = path.to_str().unwrap();
        let store = AccountStore::open(target, "accounts").unwrap();

        assert_eq!(store.count_rows().unwrap(), 1);
        assert!(store.conn.execute("DELETE FROM accounts", []).is_err());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nope.db");
        let target = path.to_str().unwrap();
        assert!(AccountStore::open(target, "accounts").is_err());
        assert!(!path.exists());
    }
}
