//! Filter entries
//!
//! Parsing of the `column[operator]` filter-key syntax and rendering of a
//! single filter condition.

use crate::dialect::DialectProfile;
use crate::errors::{BuilderError, BuilderResult};
use crate::sanitize::{sanitize_name, sanitize_operator};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Comparison operators accepted in a filter key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,      // =
    Ne,      // != or <>
    Gt,      // >
    Gte,     // >=
    Lt,      // <
    Lte,     // <=
    Like,    // LIKE
    NotLike, // NOT LIKE
    In,      // IN
    NotIn,   // NOT IN
}

impl Operator {
    /// Parse a sanitized operator token against the whitelist
    pub fn parse(column: &str, raw: &str) -> BuilderResult<Self> {
        let normalized = sanitize_operator(raw)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        match normalized.as_str() {
            "=" | "==" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            "LIKE" => Ok(Self::Like),
            "NOT LIKE" => Ok(Self::NotLike),
            "IN" => Ok(Self::In),
            "NOT IN" => Ok(Self::NotIn),
            _ => Err(BuilderError::unsupported_operator(column, raw)),
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }

    fn is_multi_value(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

/// Right-hand side of a filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(Value),
    List(Vec<Value>),
}

impl FilterValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.iter().map(scalar_of).collect()),
            other => Self::Scalar(scalar_of(other)),
        }
    }
}

/// Bound values are scalars; anything nested is passed as its JSON text
fn scalar_of(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
        other => other.clone(),
    }
}

/// One parsed `column[operator] => value` filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    pub column: String,
    pub operator: Operator,
    pub value: FilterValue,
}

fn bracket_group() -> &'static Regex {
    static BRACKETS: OnceLock<Regex> = OnceLock::new();
    BRACKETS.get_or_init(|| Regex::new(r"\[[^\[\]]+\]").expect("invalid built-in bracket regex"))
}

/// Split the trailing `[operator]` group off a filter key
fn split_operator(key: &str) -> Option<&str> {
    let trimmed = key.trim();
    let inner = trimmed.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let operator = &inner[open + 1..];

    if open == 0 || operator.is_empty() || operator.contains(']') {
        return None;
    }
    Some(operator)
}

impl FilterEntry {
    /// Parse a single filter key and its value
    pub fn parse(key: &str, value: &Value) -> BuilderResult<Self> {
        let column = sanitize_name(&bracket_group().replace_all(key, ""));
        if column.is_empty() {
            return Err(BuilderError::InvalidIdentifier(key.to_string()));
        }

        let value = FilterValue::from_json(value);
        let explicit = split_operator(key)
            .map(|raw| Operator::parse(&column, raw))
            .transpose()?;

        let operator = match (&value, explicit) {
            (FilterValue::List(_), None | Some(Operator::Eq)) => Operator::In,
            (FilterValue::List(_), Some(Operator::Ne)) => Operator::NotIn,
            (FilterValue::List(_), Some(op)) if op.is_multi_value() => op,
            (FilterValue::List(_), Some(op)) => {
                return Err(BuilderError::unsupported_operator(&column, op.to_sql()));
            }
            (FilterValue::Scalar(_), None) => Operator::Eq,
            (FilterValue::Scalar(_), Some(op)) => op,
        };

        Ok(Self {
            column,
            operator,
            value,
        })
    }

    /// Parse every entry of a filter mapping, in iteration order.
    /// `null` is an empty mapping.
    pub fn parse_all(filters: &Value) -> BuilderResult<Vec<Self>> {
        match filters {
            Value::Null => Ok(Vec::new()),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| Self::parse(key, value))
                .collect(),
            other => Err(BuilderError::unsupported_shape(format!(
                "filters must be a column mapping, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Values this condition binds, in placeholder order
    pub fn bound_values(&self) -> Vec<Value> {
        match &self.value {
            FilterValue::Scalar(Value::Null) if self.is_null_test() => Vec::new(),
            FilterValue::Scalar(value) => vec![value.clone()],
            FilterValue::List(values) => values.clone(),
        }
    }

    fn is_null_test(&self) -> bool {
        matches!(self.value, FilterValue::Scalar(Value::Null))
            && matches!(self.operator, Operator::Eq | Operator::Ne)
    }

    /// Render the condition with one placeholder per bound value.
    ///
    /// `placeholder` is called once per value, in order, and returns the text
    /// to emit for it.
    pub fn render<F>(&self, dialect: DialectProfile, mut placeholder: F) -> String
    where
        F: FnMut() -> String,
    {
        let column = dialect.quote_identifier(&self.column);

        if self.is_null_test() {
            return match self.operator {
                Operator::Ne => format!("{} IS NOT NULL", column),
                _ => format!("{} IS NULL", column),
            };
        }

        match &self.value {
            FilterValue::List(values) if values.is_empty() => match self.operator {
                Operator::NotIn => "1=1".to_string(),
                _ => "1=0".to_string(),
            },
            FilterValue::List(values) => {
                let placeholders: Vec<String> = values.iter().map(|_| placeholder()).collect();
                format!("{} {} ({})", column, self.operator.to_sql(), placeholders.join(", "))
            }
            FilterValue::Scalar(_) if self.operator.is_multi_value() => {
                format!("{} {} ({})", column, self.operator.to_sql(), placeholder())
            }
            FilterValue::Scalar(_) => {
                format!("{} {} {}", column, self.operator.to_sql(), placeholder())
            }
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
