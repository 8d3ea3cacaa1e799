//! Response envelopes described as plain data.
//!
//! # Design
//! The core never touches a socket. Handlers build an `ApiResponse` and the
//! HTTP host turns it into a real response, the same way for success and
//! error payloads. The status code is always chosen by the caller.

use serde_json::Value;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";
pub const DEFAULT_CHARSET: &str = "utf-8";

/// A serialized response: status, full `Content-Type` header value, body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: u16,
    content_type: String,
    charset: String,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new(200)
    }
}

impl ResponseBuilder {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            content_type: APPLICATION_JSON.to_string(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }

    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn charset(mut self, charset: &str) -> Self {
        self.charset = charset.to_string();
        self
    }

    pub fn json(self, body: &Value) -> ApiResponse {
        self.finish(body.to_string())
    }

    pub fn text(self, body: impl Into<String>) -> ApiResponse {
        self.finish(body.into())
    }

    fn finish(self, body: String) -> ApiResponse {
        ApiResponse {
            status: self.status,
            content_type: format!("{}; charset={}", self.content_type, self.charset),
            body,
        }
    }
}

/// JSON response with the default content type and charset.
pub fn build(body: &Value, status: u16) -> ApiResponse {
    ResponseBuilder::new(status).json(body)
}

/// Plain-text response with the default charset.
pub fn text(body: impl Into<String>, status: u16) -> ApiResponse {
    ResponseBuilder::new(status).content_type(TEXT_PLAIN).text(body)
}
