//! Acctscope CLI - account search and lookup over a SQLite accounts table

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use acctscope::config::{Overrides, Settings};

mod commands;

#[derive(Parser)]
#[command(name = "acctscope")]
#[command(version)]
#[command(about = "Account search and schema-adaptive record lookup")]
#[command(long_about = r#"
Acctscope serves account search and lookup from a SQLite accounts table
whose profile columns may follow any of several known layouts.

Example usage:
  acctscope serve --port 8080
  acctscope search acme
  acctscope get "Acme Corp"
  acctscope health

The database is taken from DATABASE_URL (or --database-url, or
database_url in acctscope.toml).
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (defaults to ./acctscope.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database connection string (overrides DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Accounts table name (overrides ACCOUNTS_TABLE)
    #[arg(short, long, global = true)]
    table: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Comma-separated CORS origins, `*` for any (overrides ALLOWED_ORIGINS)
        #[arg(long)]
        allowed_origins: Option<String>,

        /// Directory holding the static search page
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Search account names by substring
    Search {
        /// Text to look for (at least two characters)
        query: String,
    },

    /// Look up one account by exact name
    Get {
        /// Account name
        name: String,
    },

    /// Check connectivity and count rows in the accounts table
    Health,

    /// List the column layouts tried during lookup
    Layouts {
        /// Show only this layout (short, legacy or pure)
        name: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

/// JSON envelope wrapping the `data` produced by `command`.
pub fn envelope(ok: bool, command: &str, data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "ok": ok,
        "command": command,
        "data": data,
    })
}

/// Print an envelope in JSON mode; no-op for human output.
pub fn emit(output_mode: OutputMode, value: &serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Print a successful JSON envelope for `command`.
pub fn emit_success(
    output_mode: OutputMode,
    command: &str,
    data: serde_json::Value,
) -> anyhow::Result<()> {
    emit(output_mode, &envelope(true, command, data))
}

fn emit_error(output_mode: OutputMode, err: &anyhow::Error) {
    if output_mode.is_human() {
        acctscope::ui::error(&format!("{:#}", err));
    } else {
        let envelope = serde_json::json!({
            "ok": false,
            "error": format!("{:#}", err),
        });
        println!("{}", envelope);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match run(cli, output_mode) {
        Ok(code) => code,
        Err(err) => {
            emit_error(output_mode, &err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output_mode: OutputMode) -> anyhow::Result<ExitCode> {
    let mut overrides = Overrides {
        database_url: cli.database_url,
        table: cli.table,
        ..Overrides::default()
    };

    match cli.command {
        Commands::Version => commands::run_version(output_mode)?,
        Commands::Layouts { name } => commands::run_layouts(name.as_deref(), output_mode)?,

        Commands::Serve {
            port,
            allowed_origins,
            static_dir,
        } => {
            overrides.port = port;
            overrides.allowed_origins = allowed_origins;
            overrides.static_dir = static_dir;
            let settings = Settings::load(cli.config.as_deref(), &overrides)?;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(acctscope::server::start_server(settings))?;
        }

        Commands::Search { query } => {
            let settings = Settings::load(cli.config.as_deref(), &overrides)?;
            commands::run_search(&settings, &query, output_mode)?;
        }

        Commands::Get { name } => {
            let settings = Settings::load(cli.config.as_deref(), &overrides)?;
            commands::run_get(&settings, &name, output_mode)?;
        }

        Commands::Health => {
            let settings = Settings::load(cli.config.as_deref(), &overrides)?;
            return commands::run_health(&settings, output_mode);
        }
    }
    Ok(ExitCode::SUCCESS)
}
