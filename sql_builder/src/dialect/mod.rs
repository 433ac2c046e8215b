//! Dialect profiles
//!
//! A [`DialectProfile`] captures the syntax differences between backends that
//! the builder cares about: identifier quoting, positional placeholders and
//! the pagination keyword.

pub mod normalize;
pub mod placeholders;

use serde::Serialize;
use std::fmt;

/// Backend syntax variant, resolved once per connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectProfile {
    /// MySQL, MariaDB and SQLite: `` `name` ``, `?`, `LIMIT n`
    #[default]
    Default,
    /// Microsoft SQL Server family: `[name]`, `?`, `TOP n`
    SqlServer,
    /// PostgreSQL: `"name"`, `$n`, `LIMIT n`
    Postgres,
}

impl DialectProfile {
    /// Resolve a driver name as found in a DSN prefix or configuration file
    pub fn from_driver(driver: &str) -> Option<Self> {
        match driver.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" | "sqlite" | "sqlite3" => Some(Self::Default),
            "sqlsrv" | "mssql" | "dblib" | "sqlserver" => Some(Self::SqlServer),
            "pgsql" | "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }

    /// Resolve the backend name reported by a live sqlx connection
    pub fn from_backend_name(backend: &str) -> Option<Self> {
        match backend {
            "MySQL" | "SQLite" => Some(Self::Default),
            "PostgreSQL" => Some(Self::Postgres),
            "MSSQL" => Some(Self::SqlServer),
            _ => None,
        }
    }

    /// Quote an already sanitized identifier
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Self::Default => format!("`{}`", name),
            Self::SqlServer => format!("[{}]", name),
            Self::Postgres => format!("\"{}\"", name),
        }
    }

    /// Placeholder text for the 1-based parameter `index`
    pub fn positional_placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::Default | Self::SqlServer => "?".to_string(),
        }
    }

    /// Whether row limits are written as `TOP n` after the leading keyword
    pub fn uses_top(&self) -> bool {
        matches!(self, Self::SqlServer)
    }
}

impl fmt::Display for DialectProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::SqlServer => "sqlserver",
            Self::Postgres => "postgres",
        };
        write!(f, "{}", name)
    }
}
