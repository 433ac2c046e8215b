//! Error types for statement construction
//!
//! Every failure the builder can raise before a statement reaches the driver.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuilderError {
    #[error("Unsupported mapping shape: {0}")]
    UnsupportedShape(String),

    #[error("Unsupported comparison operator '{operator}' for column '{column}'")]
    UnsupportedOperator { column: String, operator: String },

    #[error("Invalid identifier: '{0}' is empty after sanitization")]
    InvalidIdentifier(String),

    #[error("No data to write into table '{0}'")]
    EmptyData(String),

    #[error("Parameter ':{0}' is bound twice")]
    ParameterCollision(String),

    #[error("Parameter ':{0}' is used in the statement but was not supplied")]
    MissingParameter(String),

    #[error("Statement has {placeholders} placeholder(s) but {values} value(s) were supplied")]
    ParameterCountMismatch { placeholders: usize, values: usize },
}

pub type BuilderResult<T> = Result<T, BuilderError>;

impl BuilderError {
    pub fn unsupported_shape(details: impl Into<String>) -> Self {
        Self::UnsupportedShape(details.into())
    }

    pub fn unsupported_operator(column: &str, operator: &str) -> Self {
        Self::UnsupportedOperator {
            column: column.to_string(),
            operator: operator.to_string(),
        }
    }
}
