//! Runtime settings.
//!
//! Resolved in layers, later layers winning: optional TOML file,
//! environment (a `.env` file is loaded first if present), CLI flags.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::storage::AccountStore;
use crate::{Error, Result};

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_TABLE: &str = "ACCOUNTS_TABLE";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_TABLE: &str = "accounts";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Keys accepted in `acctscope.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub table: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    pub static_dir: Option<String>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub table: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<String>,
    pub static_dir: Option<PathBuf>,
}

/// Cross-origin callers allowed by the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite target handed to the driver: a path or a `file:` URI
    pub database: String,
    pub table: String,
    pub port: u16,
    pub allowed_origins: AllowedOrigins,
    pub static_dir: PathBuf,
}

impl Settings {
    /// Load `.env`, the config file and the process environment, then
    /// apply `overrides`.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("ignoring unreadable .env file: {}", e);
            }
        }
        let file = load_config(config_path)?;
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge the layers. `env` looks up an environment variable.
    pub fn resolve<E>(file: Option<FileConfig>, env: E, overrides: &Overrides) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();

        let raw_dsn = overrides
            .database_url
            .clone()
            .or_else(|| env(ENV_DATABASE_URL))
            .or(file.database_url)
            .unwrap_or_default();
        let dsn = sanitize_dsn(&raw_dsn);
        if dsn.is_empty() {
            return Err(Error::Config(format!("{} is not set", ENV_DATABASE_URL)));
        }
        let database = sqlite_target(&dsn)?;

        let table = overrides
            .table
            .clone()
            .or_else(|| env(ENV_TABLE).filter(|t| !t.trim().is_empty()))
            .or(file.table)
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());
        validate_table_name(&table)?;

        let port = match (overrides.port, env(ENV_PORT)) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw.trim().parse::<u16>().map_err(|_| {
                Error::Config(format!(
                    "{} must be a port number, got '{}'",
                    ENV_PORT, raw
                ))
            })?,
            (None, None) => file.port.unwrap_or(DEFAULT_PORT),
        };

        let raw_origins = overrides
            .allowed_origins
            .clone()
            .or_else(|| env(ENV_ALLOWED_ORIGINS));
        let allowed_origins = match raw_origins {
            Some(raw) => parse_origins(&raw),
            None => file
                .allowed_origins
                .map(|list| parse_origins(&list.join(",")))
                .unwrap_or(AllowedOrigins::Any),
        };

        let static_dir = overrides
            .static_dir
            .clone()
            .or_else(|| file.static_dir.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        Ok(Self {
            database,
            table,
            port,
            allowed_origins,
            static_dir,
        })
    }

    /// Open a read-only store on the configured table
    pub fn open_store(&self) -> Result<AccountStore> {
        AccountStore::open(&self.database, &self.table)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("acctscope.toml")
}

/// Read the config file. A missing default file is not an error; a missing
/// explicitly named one is.
pub fn load_config(path: Option<&Path>) -> Result<Option<FileConfig>> {
    let explicit = path.is_some();
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!(
                "config file {} not found",
                path.display()
            )));
        }
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: FileConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

/// Strip copy/paste debris from a connection string: surrounding
/// whitespace, a leading client command (`sqlite3 ...`, `psql ...`) and
/// one layer of wrapping quotes.
pub fn sanitize_dsn(raw: &str) -> String {
    let mut dsn = raw.trim();
    for command in ["sqlite3 ", "psql "] {
        let has_prefix = dsn
            .get(..command.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(command));
        if has_prefix {
            dsn = dsn[command.len()..].trim();
            break;
        }
    }
    let quoted = dsn.len() >= 2
        && ((dsn.starts_with('\'') && dsn.ends_with('\''))
            || (dsn.starts_with('"') && dsn.ends_with('"')));
    if quoted {
        dsn = &dsn[1..dsn.len() - 1];
    }
    dsn.to_string()
}

/// Turn a sanitized connection string into something SQLite can open.
///
/// `sqlite://path` and `sqlite:path` drop the scheme; `file:` URIs and bare
/// paths pass through.
pub fn sqlite_target(dsn: &str) -> Result<String> {
    let target = if let Some(rest) = dsn.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = dsn.strip_prefix("sqlite:") {
        rest
    } else if dsn.contains("://") {
        return Err(Error::Config(format!(
            "{} must point at a SQLite database, got '{}'",
            ENV_DATABASE_URL,
            redact(dsn)
        )));
    } else {
        dsn
    };

    if target.is_empty() {
        return Err(Error::Config(format!(
            "{} has no database path",
            ENV_DATABASE_URL
        )));
    }
    Ok(target.to_string())
}

/// The table name is interpolated into SQL, so it must be a plain
/// identifier, optionally qualified by a schema name.
pub fn validate_table_name(name: &str) -> Result<()> {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let ident = IDENT.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("valid regex")
    });

    if ident.is_match(name) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be a plain SQL identifier, got '{}'",
            ENV_TABLE, name
        )))
    }
}

/// Comma-separated origins; blank or `*` means any origin.
pub fn parse_origins(raw: &str) -> AllowedOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}

/// Hide credentials in a URL-like string before it reaches logs.
fn redact(dsn: &str) -> String {
    match (dsn.find("://"), dsn.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &dsn[..scheme_end], &dsn[at..])
        }
        _ => dsn.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn resolve_env(pairs: &[(&str, &str)]) -> Result<Settings> {
        Settings::resolve(None, env_of(pairs), &Overrides::default())
    }

    #[test]
    fn test_sanitize_dsn() {
        assert_eq!(sanitize_dsn("  /data/accounts.db \n"), "/data/accounts.db");
        assert_eq!(sanitize_dsn("'sqlite:///data/a.db'"), "sqlite:///data/a.db");
        assert_eq!(sanitize_dsn("\"/data/a.db\""), "/data/a.db");
        assert_eq!(sanitize_dsn("sqlite3 '/data/a.db'"), "/data/a.db");
        assert_eq!(sanitize_dsn("PSQL 'sqlite:a.db'"), "sqlite:a.db");
        assert_eq!(sanitize_dsn("'"), "'");
        assert_eq!(sanitize_dsn(""), "");
    }

    #[test]
    fn test_sqlite_target() {
        assert_eq!(sqlite_target("sqlite:///data/a.db").unwrap(), "/data/a.db");
        assert_eq!(sqlite_target("sqlite://a.db").unwrap(), "a.db");
        assert_eq!(sqlite_target("sqlite:a.db").unwrap(), "a.db");
        assert_eq!(
            sqlite_target("file:a.db?mode=ro").unwrap(),
            "file:a.db?mode=ro"
        );
        assert_eq!(sqlite_target("accounts.db").unwrap(), "accounts.db");
        assert!(sqlite_target("sqlite://").is_err());

        let err = sqlite_target("postgresql://user:secret@db:5432/app").unwrap_err();
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn test_validate_table_name() {
        for ok in ["accounts", "crm.accounts", "_t1"] {
            assert!(validate_table_name(ok).is_ok(), "{}", ok);
        }
        for bad in [
            "",
            "1accounts",
            "accounts; DROP TABLE x",
            "a.b.c",
            "\"accounts\"",
        ] {
            assert!(validate_table_name(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins(""), AllowedOrigins::Any);
        assert_eq!(parse_origins("*"), AllowedOrigins::Any);
        assert_eq!(parse_origins(" , "), AllowedOrigins::Any);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            AllowedOrigins::List(vec!["https://a.example".into(), "https://b.example".into()])
        );
    }

    #[test]
    fn test_missing_database_url() {
        let err = resolve_env(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL is not set"));

        let err = resolve_env(&[("DATABASE_URL", " '' ")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL is not set"));
    }

    #[test]
    fn test_defaults() {
        let settings = resolve_env(&[("DATABASE_URL", "accounts.db")]).unwrap();
        assert_eq!(settings.database, "accounts.db");
        assert_eq!(settings.table, "accounts");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.allowed_origins, AllowedOrigins::Any);
        assert_eq!(settings.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn test_layer_precedence() {
        let file = FileConfig {
            database_url: Some("file.db".into()),
            table: Some("file_table".into()),
            port: Some(9000),
            allowed_origins: Some(vec!["https://file.example".into()]),
            static_dir: Some("web".into()),
        };

        let no_overrides = Overrides::default();
        let no_env = env_of(&[]);
        let from_file = Settings::resolve(Some(file.clone()), &no_env, &no_overrides);
        let from_file = from_file.unwrap();
        assert_eq!(from_file.database, "file.db");
        assert_eq!(from_file.table, "file_table");
        assert_eq!(from_file.port, 9000);
        assert_eq!(
            from_file.allowed_origins,
            AllowedOrigins::List(vec!["https://file.example".into()])
        );
        assert_eq!(from_file.static_dir, PathBuf::from("web"));

        let env = env_of(&[
            ("DATABASE_URL", "sqlite:env.db"),
            ("ACCOUNTS_TABLE", "env_table"),
            ("PORT", "9100"),
            ("ALLOWED_ORIGINS", "*"),
        ]);
        let from_env = Settings::resolve(Some(file.clone()), &env, &no_overrides);
        let from_env = from_env.unwrap();
        assert_eq!(from_env.database, "env.db");
        assert_eq!(from_env.table, "env_table");
        assert_eq!(from_env.port, 9100);
        assert_eq!(from_env.allowed_origins, AllowedOrigins::Any);

        let overrides = Overrides {
            database_url: Some("cli.db".into()),
            table: Some("cli_table".into()),
            port: Some(9200),
            allowed_origins: Some("https://cli.example".into()),
            static_dir: Some(PathBuf::from("cli_static")),
        };
        let from_cli = Settings::resolve(Some(file), &env, &overrides).unwrap();
        assert_eq!(from_cli.database, "cli.db");
        assert_eq!(from_cli.table, "cli_table");
        assert_eq!(from_cli.port, 9200);
        assert_eq!(
            from_cli.allowed_origins,
            AllowedOrigins::List(vec!["https://cli.example".into()])
        );
        assert_eq!(from_cli.static_dir, PathBuf::from("cli_static"));
    }

    #[test]
    fn test_invalid_port_and_table() {
        let env = env_of(&[("DATABASE_URL", "a.db"), ("PORT", "eighty")]);
        assert!(Settings::resolve(None, env, &Overrides::default()).is_err());

        let env = env_of(&[
            ("DATABASE_URL", "a.db"),
            ("ACCOUNTS_TABLE", "accounts--"),
        ]);
        assert!(Settings::resolve(None, env, &Overrides::default()).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("acctscope.toml");
        std::fs::write(
            &path,
            "database_url = \"a.db\"\nport = 9001\nallowed_origins = [\"https://x.example\"]\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database_url.as_deref(), Some("a.db"));
        assert_eq!(config.port, Some(9001));

        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing)).is_err());
    }
}
