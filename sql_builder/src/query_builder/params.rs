//! Bound parameters
//!
//! The values that travel next to a statement, kept aligned with the
//! placeholders it emits.

use crate::errors::{BuilderError, BuilderResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Parameters for `?` placeholders (by position) or `:name` placeholders (by name)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoundParams {
    Positional(Vec<Value>),
    Named(Map<String, Value>),
}

impl Default for BoundParams {
    fn default() -> Self {
        Self::Positional(Vec::new())
    }
}

impl BoundParams {
    /// Read caller-supplied arguments: a sequence binds by position, a
    /// mapping binds by name (a leading `:` on a key is optional).
    pub fn from_arguments(arguments: &Value) -> BuilderResult<Self> {
        match arguments {
            Value::Null => Ok(Self::default()),
            Value::Array(values) => Ok(Self::Positional(values.clone())),
            Value::Object(map) => Ok(Self::Named(
                map.iter()
                    .map(|(key, value)| (key.trim_start_matches(':').to_string(), value.clone()))
                    .collect(),
            )),
            other => Ok(Self::Positional(vec![other.clone()])),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Positional(values) => values.len(),
            Self::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a named parameter
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Named(map) => map.get(name),
            Self::Positional(_) => None,
        }
    }

    /// Combine two parameter sets produced by separate builder calls.
    ///
    /// Named sets are joined and fail on a repeated name. Positional sets are
    /// concatenated. An empty set merges with anything; mixing a non-empty
    /// named set with a non-empty positional set is rejected.
    pub fn merge(self, other: BoundParams) -> BuilderResult<BoundParams> {
        match (self, other) {
            (left, right) if right.is_empty() => Ok(left),
            (left, right) if left.is_empty() => Ok(right),
            (Self::Named(mut left), Self::Named(right)) => {
                for (name, value) in right {
                    if left.contains_key(&name) {
                        return Err(BuilderError::ParameterCollision(name));
                    }
                    left.insert(name, value);
                }
                Ok(Self::Named(left))
            }
            (Self::Positional(mut left), Self::Positional(right)) => {
                left.extend(right);
                Ok(Self::Positional(left))
            }
            _ => Err(BuilderError::unsupported_shape(
                "cannot mix named and positional parameters in one statement",
            )),
        }
    }
}
