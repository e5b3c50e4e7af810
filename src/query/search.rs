//! Substring search over account names.
//!
//! Search only needs the identifier column, which every layout shares, so
//! there is no layout fallback here.

use crate::Result;
use crate::storage::AccountStore;
use crate::storage::schema::SEARCH_LIMIT;

/// Shortest query (in characters, after trimming) that reaches storage.
pub const MIN_QUERY_CHARS: usize = 2;

/// Trim a raw query. Returns `None` when it is too short to search, in
/// which case callers answer with an empty list without opening storage.
pub fn prepare_query(raw: &str) -> Option<&str> {
    let query = raw.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        None
    } else {
        Some(query)
    }
}

/// Account names containing `query`, case-insensitive, ascending, capped
/// at [`SEARCH_LIMIT`].
pub fn search_names(store: &AccountStore, query: &str) -> Result<Vec<String>> {
    let names = store.search_names(query, SEARCH_LIMIT)?;
    tracing::debug!("search '{}' matched {} names", query, names.len());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountRecord;
    use crate::layout::SHORT;
    use crate::storage::testing::{create_table, insert};
    use rusqlite::Connection;

    #[test]
    fn test_prepare_query() {
        assert_eq!(prepare_query(""), None);
        assert_eq!(prepare_query("a"), None);
        assert_eq!(prepare_query("   a  "), None);
        assert_eq!(prepare_query("é"), None);
        assert_eq!(prepare_query(" ac "), Some("ac"));
        assert_eq!(prepare_query("äö"), Some("äö"));
    }

    #[test]
    fn test_search_caps_results() {
        let conn = Connection::open_in_memory().unwrap();
        create_table(&conn, "accounts", &SHORT);
        for i in (0..150).rev() {
            let record = AccountRecord::new(format!("Acct {:03}", i), "", "", "", "");
            insert(&conn, "accounts", &SHORT, &record);
        }
        let store = AccountStore::from_connection(conn, "accounts").unwrap();

        let names = search_names(&store, "ACCT").unwrap();
        assert_eq!(names.len(), SEARCH_LIMIT);
        assert_eq!(names.first().map(String::as_str), Some("Acct 000"));
        assert_eq!(names.last().map(String::as_str), Some("Acct 099"));
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
    }
}
