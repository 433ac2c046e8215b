//! Dialect normalizer
//!
//! A pure text pass over finished SQL: collapses whitespace, drops empty
//! clauses, terminates with a single semicolon and adapts identifier quoting
//! and pagination to the target dialect.

use crate::dialect::DialectProfile;
use regex::Regex;
use std::sync::OnceLock;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("invalid built-in normalizer regex"))
        }
    };
}

static_regex!(line_breaks, r"[\r\n]+");
static_regex!(whitespace, r"\s+");
static_regex!(empty_selection, r"(`[\w-]+`)\s*\(\s*\)");
static_regex!(empty_clause, r"(?i)\b(?:WHERE|HAVING|SET|VALUES|ON|USING)\s*\(\s*\)");
static_regex!(infinite_limit, r"(?i)\bLIMIT\s+(?:INF|INFINITY)\b");
static_regex!(backtick_identifier, r"`([^`]+)`");
static_regex!(trailing_limit, r"(?is)^(\w+)\s+(.+?)\s+LIMIT\s+(\w+)$");

fn collapse_whitespace(sql: &str) -> String {
    whitespace().replace_all(sql, " ").trim().to_string()
}

/// Trim stray semicolons and terminate with exactly one
fn terminate(sql: &str) -> String {
    let body = sql.trim_matches(|c: char| c == ';' || c.is_whitespace());
    format!("{};", body)
}

/// Drop empty groups until none are left; removing one can expose another
fn drop_empty_groups(sql: &str) -> String {
    let mut current = sql.to_string();
    loop {
        let next = empty_selection().replace_all(&current, "$1");
        let next = empty_clause().replace_all(&next, "");
        let next = infinite_limit().replace_all(&next, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Move `LIMIT n` to `TOP n` after the leading keyword, statement by statement
fn limit_to_top(sql: &str) -> String {
    sql.split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(|statement| {
            trailing_limit()
                .replace(statement, "$1 TOP $3 $2")
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Normalize SQL text for `dialect`.
///
/// The pass is idempotent: `normalize(&normalize(s, d), d) == normalize(s, d)`.
///
/// ```
/// use sql_builder::{normalize, DialectProfile};
///
/// let sql = normalize("SELECT * FROM `users`\n WHERE () LIMIT 10", DialectProfile::SqlServer);
/// assert_eq!(sql, "SELECT TOP 10 * FROM [users];");
/// ```
pub fn normalize(sql: &str, dialect: DialectProfile) -> String {
    let sql = line_breaks().replace_all(sql, "\n");
    let sql = collapse_whitespace(&sql);
    let sql = drop_empty_groups(&sql);
    let sql = terminate(&collapse_whitespace(&sql));

    let normalized = match dialect {
        DialectProfile::Default => sql,
        DialectProfile::SqlServer => {
            let bracketed = backtick_identifier().replace_all(&sql, "[$1]");
            terminate(&limit_to_top(&bracketed))
        }
        DialectProfile::Postgres => {
            let quoted = backtick_identifier().replace_all(&sql, "\"$1\"");
            terminate(&quoted)
        }
    };

    trace_log!("normalized SQL for {} dialect: {}", dialect, normalized);
    normalized
}
