//! Extracts the fields an insert needs from query parameters or a JSON body.
//!
//! # Design
//! Body parsing is kept apart from field extraction. `ParsedBody` tags the
//! three outcomes (parsed, absent, malformed) so the HTTP layer can decide
//! whether a malformed body is fatal before `normalize_parsed` runs.
//! `normalize` itself fails open: a body that does not parse counts as no
//! body at all.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::query::BindingError;

/// Outcome of reading a raw request body as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Parsed(Value),
    NoBody,
    /// The body was present but is not valid JSON. Holds the parser's reason.
    Malformed(String),
}

impl ParsedBody {
    pub fn from_bytes(raw: Option<&[u8]>) -> Self {
        let Some(raw) = raw else {
            return ParsedBody::NoBody;
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return ParsedBody::NoBody;
        }
        match serde_json::from_slice(raw) {
            Ok(value) => ParsedBody::Parsed(value),
            Err(e) => ParsedBody::Malformed(e.to_string()),
        }
    }

    /// The top-level object, if the body parsed to one.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            ParsedBody::Parsed(Value::Object(fields)) => Some(fields),
            _ => None,
        }
    }
}

/// Fields extracted for the named insert. Both are optional; the caller
/// decides whether a missing `name` is fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub name: Option<String>,
    pub url: Option<String>,
}

pub fn normalize(query: &HashMap<String, String>, raw_body: Option<&[u8]>) -> NormalizedRequest {
    normalize_parsed(query, &ParsedBody::from_bytes(raw_body))
}

/// A non-empty `name` query parameter wins outright and leaves `url` unset.
/// Otherwise `name` and `url` come from the body object, when they are strings.
pub fn normalize_parsed(query: &HashMap<String, String>, body: &ParsedBody) -> NormalizedRequest {
    if let Some(name) = query.get("name").filter(|name| !name.is_empty()) {
        return NormalizedRequest {
            name: Some(name.clone()),
            url: None,
        };
    }

    let Some(fields) = body.as_object() else {
        return NormalizedRequest::default();
    };
    NormalizedRequest {
        name: string_field(fields, "name"),
        url: string_field(fields, "url"),
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Rewrites a boolean route parameter in place to the `"1"`/`"0"` form the
/// storage layer compares against. A missing key is left for the binder to
/// report.
pub fn normalize_flag_param(params: &mut HashMap<String, String>, key: &str) -> Result<(), BindingError> {
    let Some(value) = params.get_mut(key) else {
        return Ok(());
    };
    let flag = parse_flag(value).ok_or_else(|| BindingError::InvalidValue {
        name: key.to_string(),
        value: value.clone(),
    })?;
    *value = if flag { "1" } else { "0" }.to_string();
    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Some(false)
    } else {
        None
    }
}
