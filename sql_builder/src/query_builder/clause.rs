//! Clause builder
//!
//! Turns filter mappings into `WHERE` expressions and data mappings into
//! `SET` / `VALUES` fragments. Each builder returns its own fragments and
//! parameters; merging is left to the statement assembler.

use crate::dialect::DialectProfile;
use crate::errors::{BuilderError, BuilderResult};
use crate::query_builder::filter::{json_kind, FilterEntry, Operator};
use crate::query_builder::params::BoundParams;
use crate::sanitize::{is_index_key, sanitize_name, sanitize_scalar_mapping};
use serde_json::{Map, Value};

/// SQL fragments together with the parameters their placeholders refer to
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clause {
    pub fragments: Vec<String>,
    pub params: BoundParams,
}

impl Clause {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.fragments.join(separator)
    }
}

/// Build a `WHERE` expression with positional placeholders, quoted for the
/// default dialect.
///
/// ```
/// use serde_json::json;
/// use sql_builder::build_where;
///
/// let clause = build_where(&json!({"age[>]": 5, "status": "active"})).unwrap();
/// assert_eq!(clause.join(" AND "), "`age` > ? AND `status` = ?");
/// ```
pub fn build_where(filters: &Value) -> BuilderResult<Clause> {
    build_where_for(filters, DialectProfile::Default)
}

/// Build a `WHERE` expression with positional placeholders
pub fn build_where_for(filters: &Value, dialect: DialectProfile) -> BuilderResult<Clause> {
    let entries = FilterEntry::parse_all(filters)?;
    let mut values = Vec::new();

    let fragments = entries
        .iter()
        .map(|entry| {
            values.extend(entry.bound_values());
            entry.render(dialect, || "?".to_string())
        })
        .collect();

    Ok(Clause {
        fragments,
        params: BoundParams::Positional(values),
    })
}

/// Build a `WHERE` expression with `:prefix_column` placeholders.
///
/// A column that appears more than once, or a list value, gets numbered
/// placeholder names (`:where_id_1`, `:where_id_2`, ...).
pub fn build_where_named(
    filters: &Value,
    prefix: &str,
    dialect: DialectProfile,
) -> BuilderResult<Clause> {
    let entries = FilterEntry::parse_all(filters)?;
    let prefix = placeholder_prefix(prefix);
    let mut params = Map::new();
    let mut fragments = Vec::with_capacity(entries.len());

    for entry in &entries {
        let mut values = entry.bound_values().into_iter();
        let base = placeholder_name(&prefix, &entry.column);
        let numbered = values.len() > 1;
        let mut ordinal = 0;

        let fragment = entry.render(dialect, || {
            ordinal += 1;
            let name = unique_name(&params, &base, numbered.then_some(ordinal));
            params.insert(name.clone(), values.next().unwrap_or(Value::Null));
            format!(":{}", name)
        });
        fragments.push(fragment);
    }

    Ok(Clause {
        fragments,
        params: BoundParams::Named(params),
    })
}

fn placeholder_prefix(prefix: &str) -> String {
    let prefix = sanitize_name(prefix);
    if prefix.is_empty() {
        prefix
    } else {
        format!("{}_", prefix)
    }
}

/// Placeholder names stop at the first non-word character, so hyphens in
/// column names are spelled as underscores
fn placeholder_name(prefix: &str, column: &str) -> String {
    format!("{}{}", prefix, column.replace('-', "_"))
}

fn unique_name(taken: &Map<String, Value>, base: &str, ordinal: Option<usize>) -> String {
    let mut candidate = match ordinal {
        Some(n) => format!("{}_{}", base, n),
        None => base.to_string(),
    };
    let mut extra = 1;
    while taken.contains_key(&candidate) {
        extra += 1;
        candidate = format!("{}_{}", base, extra);
    }
    candidate
}

/// How a data mapping is keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingShape {
    /// At least one key is a column name
    Associative,
    /// Keys are exactly `0..n-1`, in order
    Sequential,
}

/// Fragments for a data mapping, as produced by [`prepare_post`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostFragments {
    /// Sanitized column names; empty for sequential input
    pub fields: Vec<String>,
    pub fragments: Vec<String>,
    pub params: BoundParams,
}

/// Classify a data mapping, returning its shape and sanitized entries
pub fn classify(data: &Value) -> BuilderResult<(MappingShape, Map<String, Value>)> {
    let map = match data {
        Value::Null => return Ok((MappingShape::Associative, Map::new())),
        Value::Array(items) => {
            let indexed = items
                .iter()
                .enumerate()
                .map(|(i, value)| (i.to_string(), value.clone()))
                .collect();
            return Ok((MappingShape::Sequential, indexed));
        }
        Value::Object(map) => sanitize_scalar_mapping(map)?,
        other => {
            return Err(BuilderError::unsupported_shape(format!(
                "data must be a mapping or a sequence, got {}",
                json_kind(other)
            )))
        }
    };

    if map.is_empty() || map.keys().any(|key| !is_index_key(key)) {
        return Ok((MappingShape::Associative, map));
    }

    let contiguous = map
        .keys()
        .enumerate()
        .all(|(i, key)| key.parse::<usize>().ok() == Some(i));

    if contiguous {
        Ok((MappingShape::Sequential, map))
    } else {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        Err(BuilderError::unsupported_shape(format!(
            "integer keys [{}] are not a contiguous sequence starting at 0",
            keys.join(", ")
        )))
    }
}

/// Prepare `SET` or `VALUES` fragments for a data mapping, quoted for the
/// default dialect. See [`prepare_post_for`].
pub fn prepare_post(data: &Value, prefix: &str, operator: &str) -> BuilderResult<PostFragments> {
    prepare_post_for(data, prefix, operator, DialectProfile::Default)
}

/// Prepare `SET` or `VALUES` fragments for a data mapping.
///
/// Associative input yields `` `column` <operator> :prefix_column `` per key,
/// or a bare `:prefix_column` when `operator` is empty, with values bound by
/// name. Sequential input yields one `?` per element with values bound by
/// position.
pub fn prepare_post_for(
    data: &Value,
    prefix: &str,
    operator: &str,
    dialect: DialectProfile,
) -> BuilderResult<PostFragments> {
    let (shape, map) = classify(data)?;

    match shape {
        MappingShape::Sequential => Ok(PostFragments {
            fields: Vec::new(),
            fragments: vec!["?".to_string(); map.len()],
            params: BoundParams::Positional(map.into_iter().map(|(_, value)| value).collect()),
        }),
        MappingShape::Associative => {
            let prefix = placeholder_prefix(prefix);
            let operator = match operator.trim() {
                "" => None,
                raw => Some(Operator::parse(prefix.trim_end_matches('_'), raw)?),
            };

            let mut fields = Vec::with_capacity(map.len());
            let mut fragments = Vec::with_capacity(map.len());
            let mut params = Map::with_capacity(map.len());

            for (column, value) in map {
                if column.is_empty() {
                    return Err(BuilderError::InvalidIdentifier(column));
                }
                if value.is_array() {
                    return Err(BuilderError::unsupported_shape(format!(
                        "column '{}' holds a sequence; data mappings take scalars only",
                        column
                    )));
                }

                let name = placeholder_name(&prefix, &column);
                if params.contains_key(&name) {
                    return Err(BuilderError::ParameterCollision(name));
                }
                let fragment = match operator {
                    Some(op) => format!(
                        "{} {} :{}",
                        dialect.quote_identifier(&column),
                        op.to_sql(),
                        name
                    ),
                    None => format!(":{}", name),
                };

                fragments.push(fragment);
                params.insert(name, value);
                fields.push(column);
            }

            Ok(PostFragments {
                fields,
                fragments,
                params: BoundParams::Named(params),
            })
        }
    }
}
