//! Schema-Adaptive Resolver
//!
//! Looks an account up by exact name when the table's column names are not
//! known in advance. Each candidate layout is tried in priority order:
//!
//! 1. Layout columns exist, row found: the layout wins, stop.
//! 2. Layout columns exist, no row: the account does not exist, stop.
//! 3. Layout columns missing: roll back the attempt, try the next layout.
//! 4. Any other storage failure: abort the lookup with that error.
//!
//! Nothing is cached between lookups. The table can be reshaped while the
//! service runs and the next lookup adapts.

use crate::Result;
use crate::account::AccountRecord;
use crate::layout::{ColumnLayout, LAYOUTS};
use crate::storage::{AccountStore, StorageErrorKind};

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The account exists; `layout` names the layout that matched
    Found {
        record: AccountRecord,
        layout: &'static str,
    },
    /// A layout matched the table but no row has this name
    NotFound,
    /// No layout matched the table at all. Reported to callers exactly
    /// like `NotFound`, but it points at a misconfigured table.
    NoCompatibleLayout,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    pub fn into_record(self) -> Option<AccountRecord> {
        match self {
            Lookup::Found { record, .. } => Some(record),
            _ => None,
        }
    }
}

/// Resolves account names against one open store.
pub struct Resolver<'a> {
    store: &'a mut AccountStore,
    layouts: &'a [ColumnLayout],
}

impl<'a> Resolver<'a> {
    /// Resolver over the built-in layouts
    pub fn new(store: &'a mut AccountStore) -> Self {
        Self::with_layouts(store, LAYOUTS)
    }

    /// Resolver over a custom layout list, tried in the given order
    pub fn with_layouts(store: &'a mut AccountStore, layouts: &'a [ColumnLayout]) -> Self {
        Self { store, layouts }
    }

    /// Resolve `name` to a normalized record.
    ///
    /// An empty name is never found and does not touch storage.
    pub fn resolve(&mut self, name: &str) -> Result<Lookup> {
        if name.is_empty() {
            return Ok(Lookup::NotFound);
        }

        let mut last_mismatch = None;

        for layout in self.layouts {
            match self.store.fetch_with_layout(layout, name) {
                Ok(Some(record)) => {
                    tracing::debug!("resolved '{}' with layout '{}'", name, layout.name);
                    return Ok(Lookup::Found {
                        record: record.normalized(),
                        layout: layout.name,
                    });
                }
                Ok(None) => {
                    tracing::debug!("'{}' not present (layout '{}')", name, layout.name);
                    return Ok(Lookup::NotFound);
                }
                Err(err) if StorageErrorKind::of(&err) == StorageErrorKind::SchemaMismatch => {
                    tracing::debug!(
                        "layout '{}' does not fit table '{}': {}",
                        layout.name,
                        self.store.table(),
                        err
                    );
                    last_mismatch = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        match last_mismatch {
            Some(err) => tracing::warn!(
                "no compatible column layout on table '{}': {}",
                self.store.table(),
                err
            ),
            None => tracing::warn!("no column layouts configured"),
        }
        Ok(Lookup::NoCompatibleLayout)
    }
}
