//! Convenience re-exports for common DataHaus usage
//!
//! # Example
//!
//! ```rust
//! use datahaus::prelude::*;
//!
//! let statement = Statement::count("users", &serde_json::json!({"age[>=]": 18})).unwrap();
//! let built = statement.build(DialectProfile::SqlServer).unwrap();
//! assert_eq!(built.sql, "SELECT COUNT(*) FROM [users] WHERE ([age] >= ?);");
//! ```

// Core DataHaus components
pub use crate::connection::{Connection, ExecResult, SqlxConnection};
pub use crate::core::DataAccess;
pub use crate::errors::{DataAccessError, DataAccessResult};
pub use crate::row::Record;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig};

// Statement building
pub use sql_builder::prelude::*;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;
