//! Placeholder binding
//!
//! Drivers only accept positional parameters in their own syntax. This pass
//! rewrites `:name` and `?` placeholders found outside quoted text into the
//! dialect's positional form and lines the values up in the same order.

use crate::dialect::DialectProfile;
use crate::errors::{BuilderError, BuilderResult};
use crate::query_builder::params::BoundParams;
use serde_json::Value;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Closing delimiter if `c` opens a quoted region in `dialect`
fn quote_close(c: char, dialect: DialectProfile) -> Option<char> {
    match c {
        '\'' => Some('\''),
        '"' => Some('"'),
        '`' => Some('`'),
        '[' if dialect == DialectProfile::SqlServer => Some(']'),
        _ => None,
    }
}

/// Rewrite the placeholders of `sql` for `dialect`.
///
/// With named parameters every `:name` occurrence becomes a positional
/// placeholder and its value is appended; a name may be used more than once.
/// With positional parameters the number of `?` must match the number of
/// values. PostgreSQL placeholders are numbered `$1..$n`.
pub fn bind_placeholders(
    sql: &str,
    params: &BoundParams,
    dialect: DialectProfile,
) -> BuilderResult<(String, Vec<Value>)> {
    let chars: Vec<char> = sql.chars().collect();
    let mut output = String::with_capacity(sql.len() + 16);
    let mut values = Vec::with_capacity(params.len());
    let mut question_marks = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(close) = quote_close(c, dialect) {
            output.push(c);
            i += 1;
            while i < chars.len() {
                output.push(chars[i]);
                i += 1;
                if chars[i - 1] == close {
                    // A doubled delimiter is an escaped one; stay inside
                    if i < chars.len() && chars[i] == close && close != ']' {
                        output.push(chars[i]);
                        i += 1;
                        continue;
                    }
                    break;
                }
            }
            continue;
        }

        match (c, params) {
            // `::type` casts are not placeholders
            (':', _) if chars.get(i + 1) == Some(&':') => {
                output.push_str("::");
                i += 2;
                while i < chars.len() && chars[i] == ':' {
                    output.push(':');
                    i += 1;
                }
            }
            (':', BoundParams::Named(map))
                if chars.get(i + 1).copied().is_some_and(is_name_char) =>
            {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_name_char(chars[end]) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                let value = map
                    .get(&name)
                    .ok_or_else(|| BuilderError::MissingParameter(name.clone()))?;

                values.push(value.clone());
                output.push_str(&dialect.positional_placeholder(values.len()));
                i = end;
            }
            ('?', BoundParams::Positional(_)) => {
                question_marks += 1;
                output.push_str(&dialect.positional_placeholder(question_marks));
                i += 1;
            }
            _ => {
                output.push(c);
                i += 1;
            }
        }
    }

    if let BoundParams::Positional(supplied) = params {
        let placeholders = if question_marks == 0 && dialect == DialectProfile::Postgres {
            highest_numbered_placeholder(&output)
        } else {
            question_marks
        };

        if placeholders != supplied.len() {
            return Err(BuilderError::ParameterCountMismatch {
                placeholders,
                values: supplied.len(),
            });
        }
        values.extend(supplied.iter().cloned());
    }

    trace_log!("bound {} parameter(s) for {} dialect", values.len(), dialect);
    Ok((output, values))
}

/// Largest `$n` in SQL already written with PostgreSQL placeholders
fn highest_numbered_placeholder(sql: &str) -> usize {
    sql.split('$')
        .skip(1)
        .filter_map(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<usize>().ok()
        })
        .max()
        .unwrap_or(0)
}
