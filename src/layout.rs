//! Column layouts - known physical shapes of the accounts table
//!
//! The table is managed outside this service and has been deployed with
//! different column names over time. Each layout maps the five logical
//! record fields onto one of those shapes. Layouts are plain data; the
//! resolver walks [`LAYOUTS`] in order on every lookup.

use serde::Serialize;

/// Canonical identifier column, present under every layout.
pub const ACCOUNT_NAME_COLUMN: &str = "account_name";

/// Mapping from logical record fields to physical column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    /// Short label used in logs and CLI output
    pub name: &'static str,
    pub account_name: &'static str,
    pub owner: &'static str,
    pub email: &'static str,
    pub manager: &'static str,
    pub pam: &'static str,
}

impl ColumnLayout {
    /// Physical columns in record field order:
    /// name, owner, email, manager, pam.
    pub fn columns(&self) -> [&'static str; 5] {
        [
            self.account_name,
            self.owner,
            self.email,
            self.manager,
            self.pam,
        ]
    }

    /// Look up a layout by its label.
    pub fn by_name(name: &str) -> Option<&'static ColumnLayout> {
        LAYOUTS
            .iter()
            .find(|layout| layout.name.eq_ignore_ascii_case(name))
    }
}

/// Current short column names.
pub const SHORT: ColumnLayout = ColumnLayout {
    name: "short",
    account_name: ACCOUNT_NAME_COLUMN,
    owner: "owner",
    email: "owner_email",
    manager: "manager",
    pam: "pam",
};

/// Older export with `account_` prefixed owner and PAM columns.
pub const LEGACY: ColumnLayout = ColumnLayout {
    name: "legacy",
    account_name: ACCOUNT_NAME_COLUMN,
    owner: "account_owner",
    email: "owner_email",
    manager: "manager",
    pam: "account_pam",
};

/// Renamed export where the owner is the AE and the manager the RSD.
pub const PURE: ColumnLayout = ColumnLayout {
    name: "pure",
    account_name: ACCOUNT_NAME_COLUMN,
    owner: "pure_ae",
    email: "pure_ae_email",
    manager: "pure_rsd",
    pam: "pure_pam",
};

/// Candidate layouts in priority order.
pub const LAYOUTS: &[ColumnLayout] = &[SHORT, LEGACY, PURE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let names: Vec<_> = LAYOUTS.iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["short", "legacy", "pure"]);
    }

    #[test]
    fn test_every_layout_shares_identifier_column() {
        for layout in LAYOUTS {
            assert_eq!(layout.columns()[0], ACCOUNT_NAME_COLUMN);
        }
    }

    #[test]
    fn test_by_name() {
        assert_eq!(ColumnLayout::by_name("PURE"), Some(&PURE));
        assert_eq!(
            ColumnLayout::by_name("legacy").map(|l| l.owner),
            Some("account_owner")
        );
        assert!(ColumnLayout::by_name("wide").is_none());
    }
}
