//! Storage-ready records for the demo table.
//!
//! # Design
//! Two mapping strategies exist and are kept as distinct variants of
//! `RecordMapping`:
//! - `Named` builds a typed `DemoRecord` from a `name`/`url` pair. `name`
//!   lands in the `title` column and `completed` defaults to `false`.
//! - `Passthrough` stores the client's JSON object as-is, with only `id`
//!   replaced. Its keys are trusted to be column names; the storage layer
//!   rejects the ones that are not.
//!
//! In both cases `id` is generated server-side and never taken from the
//! client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A row as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// One row of the demo table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub url: Option<String>,
}

impl DemoRecord {
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::String(self.id.clone()));
        row.insert("title".to_string(), Value::String(self.title.clone()));
        row.insert("completed".to_string(), Value::Bool(self.completed));
        row.insert(
            "url".to_string(),
            self.url.clone().map(Value::String).unwrap_or(Value::Null),
        );
        row
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("'name' must be a non-empty string")]
    EmptyName,
}

pub fn to_record(name: &str, url: Option<&str>, id: String) -> Result<DemoRecord, MappingError> {
    if name.is_empty() {
        return Err(MappingError::EmptyName);
    }
    Ok(DemoRecord {
        id,
        title: name.to_string(),
        completed: false,
        url: url.map(str::to_string),
    })
}

/// Copies `body` and sets `id`, overwriting any client-supplied value.
pub fn to_record_from_body(mut body: Row, id: String) -> Row {
    body.insert("id".to_string(), Value::String(id));
    body
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordMapping {
    Named(DemoRecord),
    Passthrough(Row),
}

impl RecordMapping {
    pub fn id(&self) -> Option<&str> {
        match self {
            RecordMapping::Named(record) => Some(&record.id),
            RecordMapping::Passthrough(row) => row.get("id").and_then(Value::as_str),
        }
    }

    pub fn to_row(&self) -> Row {
        match self {
            RecordMapping::Named(record) => record.to_row(),
            RecordMapping::Passthrough(row) => row.clone(),
        }
    }

    pub fn into_row(self) -> Row {
        match self {
            RecordMapping::Named(record) => record.to_row(),
            RecordMapping::Passthrough(row) => row,
        }
    }
}
