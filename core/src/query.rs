//! Route-parameter binding for parameterized read queries.
//!
//! # Design
//! Templates name their parameters either as `@name` or `{name}`. Binding
//! replaces every such token with a positional `?` and appends the route
//! value to `BoundQuery::binds`, so request data never becomes SQL text.
//! Tokens inside single-quoted literals or double-quoted identifiers are
//! left untouched.
//!
//! Table names cannot be bound, so they are validated as plain identifiers
//! once (at configuration time) and interpolated quoted.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

pub const DEFAULT_TABLE: &str = "navien_demo";

/// A query ready for execution: `?` placeholders plus their values in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    pub sql: String,
    pub binds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("missing route parameter '{name}'")]
    MissingParam { name: String },

    #[error("invalid value {value:?} for route parameter '{name}'")]
    InvalidValue { name: String, value: String },
}

pub fn bind_parameters(
    template: &str,
    route_params: &HashMap<String, String>,
) -> Result<BoundQuery, BindingError> {
    let mut sql = String::with_capacity(template.len());
    let mut binds = Vec::new();
    let mut quote: Option<char> = None;
    let mut rest = template;

    while let Some(c) = rest.chars().next() {
        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            sql.push(c);
            rest = &rest[c.len_utf8()..];
            continue;
        }

        let placeholder = match c {
            '@' => leading_identifier(&rest[1..]).map(|name| (name, 1 + name.len())),
            '{' => leading_identifier(&rest[1..])
                .filter(|name| rest[1 + name.len()..].starts_with('}'))
                .map(|name| (name, 2 + name.len())),
            _ => None,
        };

        if let Some((name, consumed)) = placeholder {
            let value = route_params
                .get(name)
                .ok_or_else(|| BindingError::MissingParam {
                    name: name.to_string(),
                })?;
            binds.push(value.clone());
            sql.push('?');
            rest = &rest[consumed..];
            continue;
        }

        if c == '\'' || c == '"' {
            quote = Some(c);
        }
        sql.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Ok(BoundQuery { sql, binds })
}

/// The identifier at the start of `s`, if any.
fn leading_identifier(s: &str) -> Option<&str> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }
    let end = chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(s.len(), |(i, _)| i);
    Some(&s[..end])
}

pub fn is_identifier(s: &str) -> bool {
    leading_identifier(s).is_some_and(|ident| ident.len() == s.len())
}

pub fn quote_identifier(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid table name {0:?}: expected letters, digits and underscores")]
pub struct InvalidIdentifier(pub String);

/// A validated table name. Displays quoted, ready for interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: &str) -> Result<Self, InvalidIdentifier> {
        if is_identifier(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(InvalidIdentifier(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_identifier(&self.0))
    }
}

/// The read query templates served by the `navien-test` routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQueries {
    /// Bound from the `{id}` route parameter.
    pub by_id: String,
    /// Bound from `{val1}` (title) and `{val2}` (completed flag).
    pub by_title_and_completed: String,
}

impl ReadQueries {
    pub fn for_table(table: &TableName) -> Self {
        Self {
            by_id: format!("SELECT * FROM {table} WHERE id = @id"),
            by_title_and_completed: format!(
                "SELECT * FROM {table} WHERE title = @val1 AND completed = @val2"
            ),
        }
    }
}
