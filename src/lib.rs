//! # DataHaus
//!
//! A small async data-access layer: declarative filter and data mappings become
//! sanitized, parameterized SQL for MySQL, PostgreSQL, SQLite and SQL Server
//! dialects, executed over one connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use datahaus::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let mut db = DataAccess::connect(&config).await?;
//!
//!     // UPDATE `tbl_2fa_login` SET `2fa_code` = ? WHERE (`2fa_id` = ?);
//!     db.write("tbl_2fa_login", &json!({"2fa_id": 1}), &json!({"2fa_code": 4821})).await?;
//!
//!     let row = db.get_row("tbl_2fa_login", &json!({"2fa_id": 1})).await?;
//!     let pending = db.count("tbl_2fa_login", &json!({"2fa_code[!=]": null})).await?;
//!     println!("{:?} ({} pending)", row, pending);
//!
//!     db.close().await?;
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod connection;
pub mod core;
pub mod errors;
pub mod prelude;
pub mod row;

// Re-export the main public types for convenience
pub use crate::connection::{Connection, ExecResult, SqlxConnection};
pub use crate::core::DataAccess;
pub use crate::errors::{DataAccessError, DataAccessResult};
pub use crate::row::Record;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig};

// Re-export the statement builder
pub use sql_builder;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
