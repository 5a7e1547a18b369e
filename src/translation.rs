use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DbError;
use crate::types::RowValues;

lazy_static! {
    /// `:name:` tokens. Tokens never span a line, and `::` (an empty token) is matched so it
    /// can be skipped as a unit, which keeps Postgres casts like `id::text` intact.
    static ref NAMED_PLACEHOLDER: Regex =
        Regex::new(r":[^:\n]*:").expect("named placeholder pattern is valid");
}

/// A query rewritten to the driver's positional `$n` syntax with its ordered values.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalQuery {
    pub sql: String,
    pub values: Vec<RowValues>,
}

/// Names of every non-empty `:name:` placeholder in text order, repeats included.
#[must_use]
pub fn placeholder_names(sql: &str) -> Vec<&str> {
    NAMED_PLACEHOLDER
        .find_iter(sql)
        .map(|m| token(m.as_str()))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Rewrite `:name:` placeholders into `$1, $2, ...` in order of appearance.
///
/// Each occurrence gets its own marker and its own copy of the value, so a name used twice
/// produces two markers and two values.
///
/// # Errors
/// Returns [`DbError::MissingValue`] for the first placeholder that has no bound value.
pub fn translate_named_placeholders(
    sql: &str,
    params: &HashMap<String, RowValues>,
) -> Result<PositionalQuery, DbError> {
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut last = 0;

    for m in NAMED_PLACEHOLDER.find_iter(sql) {
        let name = token(m.as_str());
        if name.is_empty() {
            continue;
        }

        let value = params
            .get(name)
            .ok_or_else(|| DbError::MissingValue(name.to_string()))?;
        values.push(value.clone());

        out.push_str(&sql[last..m.start()]);
        out.push('$');
        out.push_str(&values.len().to_string());
        last = m.end();
    }
    out.push_str(&sql[last..]);

    Ok(PositionalQuery { sql: out, values })
}

fn token(matched: &str) -> &str {
    &matched[1..matched.len() - 1]
}
