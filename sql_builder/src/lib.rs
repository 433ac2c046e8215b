//! SQL builder for the DataHaus data-access layer
//!
//! This crate turns declarative filter and data mappings into parameterized
//! SQL: sanitizers for identifiers and values, the `column[operator]` filter
//! syntax, statement assembly and the per-dialect normalization pass.
//!
//! ```
//! use serde_json::json;
//! use sql_builder::{DialectProfile, Statement};
//!
//! let statement = Statement::update(
//!     "tbl_2fa_login",
//!     &json!({"2fa_id": 1}),
//!     &json!({"2fa_code": 4821}),
//! ).unwrap();
//!
//! let built = statement.build(DialectProfile::Default).unwrap();
//! assert_eq!(
//!     built.sql,
//!     "UPDATE `tbl_2fa_login` SET `2fa_code` = :set_2fa_code WHERE (`2fa_id` = :where_2fa_id);"
//! );
//! ```

#[cfg(feature = "debug-logging")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod dialect;
pub mod errors;
pub mod prelude;
pub mod query_builder;
pub mod sanitize;

pub use dialect::normalize::normalize;
pub use dialect::placeholders::bind_placeholders;
pub use dialect::DialectProfile;
pub use errors::{BuilderError, BuilderResult};
pub use query_builder::{
    build_where, prepare_post, BoundParams, BuiltStatement, Clause, FilterEntry, Operator,
    Statement,
};
pub use sanitize::{
    sanitize_filter_values, sanitize_integer, sanitize_name, sanitize_operator,
    sanitize_scalar_mapping, sanitize_type, TableName,
};
