use tabled::{Table, Tabled, settings::Style};

use crate::account::AccountRecord;
use crate::layout::ColumnLayout;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct NameRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Account")]
    name: String,
}

#[derive(Tabled)]
struct LayoutRow {
    #[tabled(rename = "Priority")]
    priority: usize,
    #[tabled(rename = "Layout")]
    name: &'static str,
    #[tabled(rename = "Owner")]
    owner: &'static str,
    #[tabled(rename = "Email")]
    email: &'static str,
    #[tabled(rename = "Manager")]
    manager: &'static str,
    #[tabled(rename = "PAM")]
    pam: &'static str,
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Two-column field/value table for one account
pub fn record_table(record: &AccountRecord) -> String {
    let rows = [
        ("Name", &record.name),
        ("Owner", &record.owner),
        ("Email", &record.email),
        ("Manager", &record.manager),
        ("PAM", &record.pam),
    ]
    .into_iter()
    .map(|(field, value)| FieldRow {
        field,
        value: or_dash(value),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Numbered list of account names; empty string for no names
pub fn names_table(names: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }
    let rows = names
        .iter()
        .enumerate()
        .map(|(i, name)| NameRow {
            index: i + 1,
            name: name.clone(),
        });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Candidate layouts in the order they are tried
pub fn layouts_table(layouts: &[ColumnLayout]) -> String {
    let rows = layouts.iter().enumerate().map(|(i, layout)| LayoutRow {
        priority: i + 1,
        name: layout.name,
        owner: layout.owner,
        email: layout.email,
        manager: layout.manager,
        pam: layout.pam,
    });
    Table::new(rows).with(Style::rounded()).to_string()
}
