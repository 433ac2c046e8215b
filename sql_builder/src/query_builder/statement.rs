//! Statement assembler
//!
//! Statements are kept as a small structured value (table, filters, data,
//! limit) and rendered per dialect, so quoting and pagination never have to
//! be patched into finished text. The rendered SQL still goes through
//! [`normalize`] as a final pass.

use crate::dialect::normalize::normalize;
use crate::dialect::placeholders::bind_placeholders;
use crate::dialect::DialectProfile;
use crate::errors::{BuilderError, BuilderResult};
use crate::query_builder::clause::{
    build_where_for, build_where_named, classify, prepare_post_for, Clause, MappingShape,
};
use crate::query_builder::filter::FilterEntry;
use crate::query_builder::params::BoundParams;
use crate::sanitize::{sanitize_integer, TableName};
use serde::Serialize;
use serde_json::Value;

/// One of the four statement shapes the data-access layer issues
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select {
        table: TableName,
        filters: Value,
        limit: Option<u64>,
    },
    Count {
        table: TableName,
        filters: Value,
    },
    Update {
        table: TableName,
        filters: Value,
        data: Value,
    },
    Insert {
        table: TableName,
        data: Value,
    },
}

/// Rendered, normalized SQL and the parameters its placeholders refer to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltStatement {
    pub sql: String,
    pub params: BoundParams,
    pub dialect: DialectProfile,
}

impl BuiltStatement {
    /// Convert to the driver's positional placeholder form
    pub fn bind(&self) -> BuilderResult<(String, Vec<Value>)> {
        bind_placeholders(&self.sql, &self.params, self.dialect)
    }
}

fn positive_limit(limit: i64) -> Option<u64> {
    u64::try_from(limit).ok().filter(|n| *n > 0)
}

fn where_section(clause: &Clause) -> String {
    if clause.is_empty() {
        String::new()
    } else {
        format!(" WHERE ({})", clause.join(" AND "))
    }
}

impl Statement {
    /// `SELECT *` with an optional row limit; `limit <= 0` means unbounded
    pub fn select(table: &str, filters: &Value, limit: i64) -> BuilderResult<Self> {
        FilterEntry::parse_all(filters)?;
        Ok(Self::Select {
            table: TableName::new(table)?,
            filters: filters.clone(),
            limit: positive_limit(limit),
        })
    }

    /// `SELECT *` with a loosely formatted limit such as `"1,000"` or `null`
    pub fn select_with_raw_limit(table: &str, filters: &Value, limit: &Value) -> BuilderResult<Self> {
        Self::select(table, filters, sanitize_integer(limit).unwrap_or(0))
    }

    /// `SELECT COUNT(*)`
    pub fn count(table: &str, filters: &Value) -> BuilderResult<Self> {
        FilterEntry::parse_all(filters)?;
        Ok(Self::Count {
            table: TableName::new(table)?,
            filters: filters.clone(),
        })
    }

    /// `UPDATE ... SET ... WHERE ...`
    pub fn update(table: &str, filters: &Value, data: &Value) -> BuilderResult<Self> {
        let table = TableName::new(table)?;
        FilterEntry::parse_all(filters)?;

        let (shape, map) = classify(data)?;
        if map.is_empty() {
            return Err(BuilderError::EmptyData(table.to_string()));
        }
        if shape == MappingShape::Sequential {
            return Err(BuilderError::unsupported_shape(
                "UPDATE data must name its columns",
            ));
        }

        Ok(Self::Update {
            table,
            filters: filters.clone(),
            data: data.clone(),
        })
    }

    /// `INSERT INTO ... VALUES ...`
    pub fn insert(table: &str, data: &Value) -> BuilderResult<Self> {
        let table = TableName::new(table)?;
        let (_, map) = classify(data)?;
        if map.is_empty() {
            return Err(BuilderError::EmptyData(table.to_string()));
        }

        Ok(Self::Insert {
            table,
            data: data.clone(),
        })
    }

    pub fn table(&self) -> &TableName {
        match self {
            Self::Select { table, .. }
            | Self::Count { table, .. }
            | Self::Update { table, .. }
            | Self::Insert { table, .. } => table,
        }
    }

    /// Render for `dialect` and normalize
    pub fn build(&self, dialect: DialectProfile) -> BuilderResult<BuiltStatement> {
        let (raw, params) = self.render(dialect)?;

        Ok(BuiltStatement {
            sql: normalize(&raw, dialect),
            params,
            dialect,
        })
    }

    fn render(&self, dialect: DialectProfile) -> BuilderResult<(String, BoundParams)> {
        let table = dialect.quote_identifier(self.table().as_str());

        match self {
            Self::Select { filters, limit, .. } => {
                let clause = build_where_for(filters, dialect)?;
                let sql = match (limit, dialect.uses_top()) {
                    (Some(n), true) => {
                        format!("SELECT TOP {} * FROM {}{}", n, table, where_section(&clause))
                    }
                    (Some(n), false) => {
                        format!("SELECT * FROM {}{} LIMIT {}", table, where_section(&clause), n)
                    }
                    (None, _) => format!("SELECT * FROM {}{}", table, where_section(&clause)),
                };
                Ok((sql, clause.params))
            }
            Self::Count { filters, .. } => {
                let clause = build_where_for(filters, dialect)?;
                let sql = format!("SELECT COUNT(*) FROM {}{}", table, where_section(&clause));
                Ok((sql, clause.params))
            }
            Self::Update { filters, data, .. } => {
                let set = prepare_post_for(data, "set", "=", dialect)?;
                let clause = build_where_named(filters, "where", dialect)?;
                let sql = format!(
                    "UPDATE {} SET {}{}",
                    table,
                    set.fragments.join(", "),
                    where_section(&clause)
                );
                Ok((sql, set.params.merge(clause.params)?))
            }
            Self::Insert { data, .. } => {
                let post = prepare_post_for(data, "insert", "", dialect)?;
                let columns = post
                    .fields
                    .iter()
                    .map(|field| dialect.quote_identifier(field))
                    .collect::<Vec<_>>();
                let column_list = if columns.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", columns.join(", "))
                };
                let sql = format!(
                    "INSERT INTO {}{} VALUES ({})",
                    table,
                    column_list,
                    post.fragments.join(", ")
                );
                Ok((sql, post.params))
            }
        }
    }
}
