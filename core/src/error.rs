//! Error taxonomy for the request pipeline.
//!
//! # Design
//! Each failure kind owns its HTTP status (`ErrorKind::status`), so handlers
//! never pick error statuses themselves. Client mistakes map to 4xx; only
//! opaque storage failures map to 500, and their driver detail is kept out
//! of the response body.

use serde_json::json;
use thiserror::Error;

use crate::query::BindingError;
use crate::record::MappingError;
use crate::response::{self, ApiResponse};
use crate::schema::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingRequiredField,
    JsonParse,
    Validation,
    Binding,
    Mapping,
    StorageRejected,
    Storage,
}

impl ErrorKind {
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::MissingRequiredField
            | ErrorKind::JsonParse
            | ErrorKind::Binding
            | ErrorKind::Mapping
            | ErrorKind::StorageRejected => 400,
            ErrorKind::Validation => 422,
            ErrorKind::Storage => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please pass a {0} on the query string or in the request body")]
    MissingRequiredField(&'static str),

    #[error("request body is not valid JSON: {0}")]
    JsonParse(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The storage engine refused the row (unknown column, constraint).
    #[error("record rejected by storage: {0}")]
    StorageRejected(String),

    /// Any other storage failure. The detail is for logs only.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MissingRequiredField(_) => ErrorKind::MissingRequiredField,
            ApiError::JsonParse(_) => ErrorKind::JsonParse,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Binding(_) => ErrorKind::Binding,
            ApiError::Mapping(_) => ErrorKind::Mapping,
            ApiError::StorageRejected(_) => ErrorKind::StorageRejected,
            ApiError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn status(&self) -> u16 {
        self.kind().status()
    }

    /// Message shown to clients.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Storage(_) => "internal storage error".to_string(),
            other => other.to_string(),
        }
    }

    /// `{"error": "..."}` with the status of this error's kind.
    pub fn into_envelope(self) -> ApiResponse {
        response::build(&json!({ "error": self.public_message() }), self.status())
    }
}
