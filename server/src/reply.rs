//! Converts core envelopes and errors into axum responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use navien_core::{ApiError, ApiResponse};

/// A successful handler result.
#[derive(Debug)]
pub struct Reply(pub ApiResponse);

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let ApiResponse {
            status,
            content_type,
            body,
        } = self.0;
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}

/// A failed handler result; the status comes from the error's kind.
#[derive(Debug)]
pub struct Failure(pub ApiError);

impl<E> From<E> for Failure
where
    E: Into<ApiError>,
{
    fn from(err: E) -> Self {
        Failure(err.into())
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.status() >= 500 {
            tracing::error!(error = %err, "request failed");
        } else {
            tracing::debug!(error = %err, status = err.status(), "request rejected");
        }
        Reply(err.into_envelope()).into_response()
    }
}
