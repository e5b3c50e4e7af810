//! Account record - the externally visible projection of one table row
//!
//! The record is assembled from whichever column layout matched and is
//! normalized before it leaves the core.

use serde::{Deserialize, Serialize};

/// Owner value used by CRM sync for accounts that have no human owner.
pub const SERVICE_ACCOUNT_OWNER: &str = "Salesforce Service Account";

/// Replacement owner for service-account rows.
pub const UNASSIGNED_OWNER: &str = "Not Assigned";

/// An account as returned to callers.
///
/// Only `name` is guaranteed non-empty; every other field is an empty
/// string when the underlying column is NULL or blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub name: String,
    pub owner: String,
    pub email: String,
    pub manager: String,
    pub pam: String,
}

impl AccountRecord {
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        email: impl Into<String>,
        manager: impl Into<String>,
        pam: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            email: email.into(),
            manager: manager.into(),
            pam: pam.into(),
        }
    }

    /// Whether the owner is the service-account placeholder
    /// (surrounding whitespace and letter case ignored).
    pub fn has_service_owner(&self) -> bool {
        self.owner.trim().to_lowercase() == SERVICE_ACCOUNT_OWNER.to_lowercase()
    }

    /// Rewrite the service-account owner to the unassigned marker and
    /// blank its email. Other records pass through untouched.
    pub fn normalized(mut self) -> Self {
        if self.has_service_owner() {
            self.owner = UNASSIGNED_OWNER.to_string();
            self.email.clear();
        }
        self
    }
}

impl std::fmt::Display for AccountRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (owner: {}", self.name, display_or_dash(&self.owner))?;
        if !self.email.is_empty() {
            write!(f, " <{}>", self.email)?;
        }
        write!(
            f,
            ", manager: {}, pam: {})",
            display_or_dash(&self.manager),
            display_or_dash(&self.pam)
        )
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
