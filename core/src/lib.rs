//! Request pipeline for the navien demo table.
//!
//! # Overview
//! Turns raw HTTP inputs (query parameters, body bytes, route parameters)
//! into storage-ready records or bound read queries, and turns results and
//! errors into uniform response envelopes. Nothing here performs I/O; the
//! HTTP host and the storage engine live in the server crate.
//!
//! # Design
//! - Every step is a plain function over owned or borrowed data, so each can
//!   be tested without a server.
//! - Malformed bodies are a tagged outcome (`ParsedBody::Malformed`), not a
//!   swallowed error; the fail-open policy lives in `normalize`.
//! - Error kinds carry their HTTP status (`ErrorKind::status`).
//! - Read queries only ever use positional placeholders; route values are
//!   returned as bind values.

pub mod error;
pub mod id;
pub mod normalize;
pub mod query;
pub mod record;
pub mod response;
pub mod schema;

pub use error::{ApiError, ErrorKind};
pub use normalize::{normalize, normalize_flag_param, normalize_parsed, NormalizedRequest, ParsedBody};
pub use query::{bind_parameters, BindingError, BoundQuery, ReadQueries, TableName};
pub use record::{to_record, to_record_from_body, DemoRecord, MappingError, RecordMapping, Row};
pub use response::{ApiResponse, ResponseBuilder};
pub use schema::{validate, SchemaDecl, ValidationError, DEMO_SCHEMA};
