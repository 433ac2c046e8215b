//! Sanitizers
//!
//! Pure functions that clean identifier, operator, integer and value input
//! before any of it is interpolated into SQL text.

use crate::errors::{BuilderError, BuilderResult};
use crate::query_builder::filter::FilterEntry;
use serde_json::{Map, Value};
use std::fmt;

/// Maximum length of a sanitized identifier or operator, in characters
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

fn truncate_chars(mut input: String, max: usize) -> String {
    if let Some((byte_index, _)) = input.char_indices().nth(max) {
        input.truncate(byte_index);
    }
    input
}

/// Clean a table or column name.
///
/// Whitespace runs become a single underscore, every character that is not an
/// ASCII word character or hyphen is dropped, and the result is cut to
/// [`MAX_IDENTIFIER_LENGTH`] characters.
pub fn sanitize_name(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut in_whitespace = false;

    for c in input.trim().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                output.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            output.push(c);
        }
    }

    truncate_chars(output, MAX_IDENTIFIER_LENGTH)
}

/// Trim and truncate a comparison operator. No other cleaning happens here;
/// whitelisting is done by [`crate::query_builder::filter::Operator::parse`].
pub fn sanitize_operator(input: &str) -> String {
    truncate_chars(input.trim().to_string(), MAX_IDENTIFIER_LENGTH)
}

/// Clean a column type declaration such as `VARCHAR(255)`.
pub fn sanitize_type(input: &str) -> String {
    let kept: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || *c == '(' || *c == ')')
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse the integer a loosely formatted string denotes.
///
/// Whitespace and comma digit separators are removed first; the leading
/// signed digit run is parsed and anything after it is ignored. Input with
/// no leading digits yields zero. Out of range values saturate.
pub fn parse_integer(input: &str) -> i64 {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    let mut chars = compact.chars().peekable();
    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for c in chars {
        let Some(digit) = c.to_digit(10) else {
            break;
        };
        let digit = i64::from(digit);
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }

    value
}

/// Clean an integer argument such as a row limit.
///
/// `null` passes through as `None`, integers are returned unchanged and
/// everything else is read through [`parse_integer`].
pub fn sanitize_integer(input: &Value) -> Option<i64> {
    match input {
        Value::Null => None,
        Value::Number(n) => Some(
            n.as_i64()
                .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or_default(),
        ),
        Value::String(s) => Some(parse_integer(s)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Array(_) | Value::Object(_) => Some(0),
    }
}

/// Whether a mapping key denotes a sequence index
pub(crate) fn is_index_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_digit())
}

/// Normalize the keys and values of a data mapping.
///
/// Digit-only keys are read as integers, every other key goes through
/// [`sanitize_name`]. Scalars keep their JSON type, arrays pass through for
/// later expansion and nested objects are cast to their JSON text.
///
/// Two keys that clean up to the same key (`"first name"` and `"first_name"`,
/// `"01"` and `"1"`) are rejected with [`BuilderError::ParameterCollision`].
pub fn sanitize_scalar_mapping(mapping: &Map<String, Value>) -> BuilderResult<Map<String, Value>> {
    let mut output = Map::with_capacity(mapping.len());

    for (key, value) in mapping {
        let key = if is_index_key(key) {
            parse_integer(key).to_string()
        } else {
            sanitize_name(key)
        };

        let value = match value {
            Value::Object(_) => Value::String(value.to_string()),
            other => other.clone(),
        };

        if output.contains_key(&key) {
            return Err(BuilderError::ParameterCollision(key));
        }
        output.insert(key, value);
    }

    Ok(output)
}

/// Flatten a filter mapping into the ordered bind list that accompanies its
/// `WHERE` clause. The order always matches the placeholders emitted by
/// [`crate::query_builder::clause::build_where`].
pub fn sanitize_filter_values(filters: &Value) -> BuilderResult<Vec<Value>> {
    let entries = FilterEntry::parse_all(filters)?;
    Ok(entries.iter().flat_map(FilterEntry::bound_values).collect())
}

/// A table name that survived sanitization and is safe to quote into SQL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Sanitize `name`, rejecting input that cleans down to nothing
    pub fn new(name: &str) -> BuilderResult<Self> {
        let sanitized = sanitize_name(name);
        if sanitized.is_empty() {
            return Err(BuilderError::InvalidIdentifier(name.to_string()));
        }
        Ok(Self(sanitized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
