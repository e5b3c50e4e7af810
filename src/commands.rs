use crate::{OutputMode, emit, emit_success, envelope};
use acctscope::config::Settings;
use acctscope::layout::{ColumnLayout, LAYOUTS};
use acctscope::query::{self, HealthReport, Lookup, Resolver};
use acctscope::ui::{self, Icons};
use owo_colors::OwoColorize;
use std::process::ExitCode;

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        println!(
            "{} {}",
            "acctscope".bold().style(ui::theme().header.clone()),
            env!("CARGO_PKG_VERSION")
        );
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}

pub fn run_layouts(name: Option<&str>, output_mode: OutputMode) -> anyhow::Result<()> {
    let layouts = match name {
        Some(name) => match ColumnLayout::by_name(name) {
            Some(layout) => std::slice::from_ref(layout),
            None => {
                let known: Vec<_> = LAYOUTS.iter().map(|l| l.name).collect();
                anyhow::bail!("unknown layout '{}' (known: {})", name, known.join(", "));
            }
        },
        None => LAYOUTS,
    };

    if output_mode.is_human() {
        ui::header(Icons::LAYOUT, "Column layouts (tried in order)");
        println!("{}", ui::layouts_table(layouts));
    } else {
        emit_success(output_mode, "layouts", serde_json::to_value(layouts)?)?;
    }
    Ok(())
}

pub fn run_search(
    settings: &Settings,
    raw_query: &str,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let names = match query::prepare_query(raw_query) {
        Some(q) => {
            let store = settings.open_store()?;
            query::search_names(&store, q)?
        }
        None => {
            if output_mode.is_human() {
                ui::warn(&format!(
                    "Query must be at least {} characters.",
                    query::MIN_QUERY_CHARS
                ));
            }
            Vec::new()
        }
    };

    if output_mode.is_human() {
        ui::header(
            Icons::SEARCH,
            &format!("Accounts matching '{}'", raw_query.trim()),
        );
        if names.is_empty() {
            println!("{} No accounts found.", Icons::EMPTY);
        } else {
            println!("{}", ui::names_table(&names));
            ui::summary_row("Matches:", &names.len().to_string());
        }
    } else {
        emit_success(output_mode, "search", serde_json::json!({ "items": names }))?;
    }
    Ok(())
}

pub fn run_get(settings: &Settings, raw_name: &str, output_mode: OutputMode) -> anyhow::Result<()> {
    let name = raw_name.trim();
    if name.is_empty() {
        anyhow::bail!("missing parameter: name");
    }

    let mut store = settings.open_store()?;
    let lookup = Resolver::new(&mut store).resolve(name)?;

    if output_mode.is_human() {
        ui::header(Icons::PERSON, &format!("Account '{}'", name));
        match &lookup {
            Lookup::Found { record, layout } => {
                ui::section("Record");
                println!("{}", ui::record_table(record));
                ui::summary_row("Layout:", layout);
            }
            Lookup::NotFound => {
                println!("{} Account not found.", Icons::CROSS);
            }
            Lookup::NoCompatibleLayout => {
                println!("{} Account not found.", Icons::CROSS);
                ui::warn(&format!(
                    "Table '{}' matches no known column layout (see `acctscope layouts`).",
                    settings.table
                ));
            }
        }
    } else {
        let data = match &lookup {
            Lookup::Found { record, layout } => serde_json::json!({
                "found": true,
                "layout": layout,
                "name": record.name,
                "owner": record.owner,
                "email": record.email,
                "manager": record.manager,
                "pam": record.pam,
            }),
            _ => serde_json::json!({ "found": false }),
        };
        emit_success(output_mode, "get", data)?;
    }
    Ok(())
}

/// Exits non-zero when storage is unreachable; the report is printed either way.
pub fn run_health(settings: &Settings, output_mode: OutputMode) -> anyhow::Result<ExitCode> {
    let report = query::check_health(&settings.table, || settings.open_store());

    if output_mode.is_human() {
        ui::header(Icons::DATABASE, "Health");
        ui::info("Database", &settings.database);
        ui::info("Table", &report.table);
        ui::section("Storage");
        match (report.ok, report.rows) {
            (true, Some(rows)) => {
                ui::info("Rows", &rows.to_string());
                ui::success("Storage reachable");
            }
            _ => ui::error(&format!(
                "health check failed for table '{}': {}",
                report.table,
                report.error.as_deref().unwrap_or("unknown error")
            )),
        }
    } else {
        emit(output_mode, &health_envelope(&report)?)?;
    }

    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn health_envelope(report: &HealthReport) -> serde_json::Result<serde_json::Value> {
    Ok(envelope(report.ok, "health", serde_json::to_value(report)?))
}
