//! # Transport Boundary
//!
//! The orchestrator describes every network call as a [`Request`] and hands it
//! to a [`Transport`]. Any HTTP client satisfying the trait is pluggable; the
//! crate ships a `reqwest` implementation in [`http`] and an expectation-based
//! double in [`crate::mock`].
//!
//! Retries, timeouts and circuit breaking belong to the transport, not to the
//! orchestrator.

pub mod http;

use crate::method::Verb;
use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpTransport;

/// Errors surfaced by a transport. Propagated to the dispatch caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{verb} {url} returned status {status}")]
    Status { verb: Verb, url: String, status: u16 },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// One network call: verb, resolved URL and an optional structured payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub verb: Verb,
    pub url: String,
    pub body: Option<Value>,
    pub query: Option<Value>,
}

impl Request {
    pub fn new(verb: Verb, url: impl Into<String>) -> Self {
        Self {
            verb,
            url: url.into(),
            body: None,
            query: None,
        }
    }

    /// Attaches `payload` as body, or as query parameters when `as_params`.
    ///
    /// Scalars (ids, strings, null) are never attached; they only feed the URL.
    /// Query parameters must be a flat object of scalars. Arrays and nested
    /// objects cannot be url-encoded and fail as [`TransportError::Http`].
    pub fn with_payload(mut self, payload: Value, as_params: bool) -> Self {
        if !is_structured(&payload) {
            return self;
        }
        if as_params {
            self.query = Some(payload);
        } else {
            self.body = Some(payload);
        }
        self
    }
}

pub fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Issues requests and returns the decoded response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: Request) -> Result<Value, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_payload_goes_to_body() {
        let request = Request::new(Verb::Post, "/api/users").with_payload(json!({ "name": "a" }), false);
        assert_eq!(request.body, Some(json!({ "name": "a" })));
        assert_eq!(request.query, None);
    }

    #[test]
    fn test_as_params_moves_payload_to_query() {
        let request = Request::new(Verb::Get, "/api/users").with_payload(json!({ "page": 2 }), true);
        assert_eq!(request.body, None);
        assert_eq!(request.query, Some(json!({ "page": 2 })));
    }

    #[test]
    fn test_scalar_payload_is_omitted() {
        let request = Request::new(Verb::Delete, "/api/users/7").with_payload(json!(7), false);
        assert_eq!(request, Request::new(Verb::Delete, "/api/users/7"));
    }
}
