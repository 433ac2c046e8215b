//! Error types for the DataHaus crate
//!
//! This module contains all error types that can be returned by DataHaus operations.

use config::ConfigError;
use sql_builder::BuilderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Database connection error: {0}")]
    ConnectionFailure(#[source] sqlx::Error),

    #[error("Statement error: {0}")]
    Builder(#[from] BuilderError),

    #[error("Execution failed for '{sql}': {source}")]
    ExecutionFailure {
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A [`Connection`](crate::Connection) was used after its own `close`.
    /// `DataAccess::close` consumes the facade, so only direct connection
    /// users can observe this.
    #[error("Connection is closed")]
    Closed,
}

impl DataAccessError {
    pub fn execution(sql: &str, source: sqlx::Error) -> Self {
        Self::ExecutionFailure {
            sql: sql.to_string(),
            source,
        }
    }

    pub fn decode(details: impl Into<String>) -> Self {
        Self::Decode(details.into())
    }
}

pub type DataAccessResult<T> = Result<T, DataAccessError>;
