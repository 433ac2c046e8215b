//! Convenience re-exports for common sql-builder usage

pub use crate::dialect::DialectProfile;
pub use crate::errors::{BuilderError, BuilderResult};
pub use crate::query_builder::{BoundParams, BuiltStatement, FilterEntry, Operator, Statement};
pub use crate::sanitize::TableName;
