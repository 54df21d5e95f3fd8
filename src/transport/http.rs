//! `reqwest`-backed [`Transport`].

use super::{Request, Transport, TransportError};
use crate::method::Verb;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

/// Sends requests with a shared `reqwest::Client`.
///
/// Templates are usually relative (`/api/users/:id`); set a base URL to prefix
/// them with a scheme and host.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Some(base_url.into()),
        }
    }

    pub fn with_client(client: reqwest::Client, base_url: Option<String>) -> Self {
        Self { client, base_url }
    }

    fn absolute_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url.to_string(),
        }
    }

    /// Builds the `reqwest` request without sending it.
    pub fn build(&self, request: &Request) -> Result<reqwest::Request, TransportError> {
        let mut builder = self
            .client
            .request(method(request.verb), self.absolute_url(&request.url));

        if let Some(query) = &request.query {
            builder = builder.query(query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.build()?)
    }
}

fn method(verb: Verb) -> Method {
    match verb {
        Verb::Get => Method::GET,
        Verb::Post => Method::POST,
        Verb::Put => Method::PUT,
        Verb::Patch => Method::PATCH,
        Verb::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(verb = %request.verb, url = %request.url))]
    async fn request(&self, request: Request) -> Result<Value, TransportError> {
        let http_request = self.build(&request)?;
        let response = self.client.execute(http_request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                verb: request.verb,
                url: request.url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), len = bytes.len(), "Response received");
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(TransportError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_prefixes_base_url_and_encodes_body() {
        let transport = HttpTransport::with_base_url("http://localhost:8080/");
        let request = Request::new(Verb::Put, "/api/users/7").with_payload(json!({ "id": 7 }), false);

        let built = transport.build(&request).unwrap();
        assert_eq!(built.method(), &Method::PUT);
        assert_eq!(built.url().as_str(), "http://localhost:8080/api/users/7");

        let body = built.body().and_then(|b| b.as_bytes()).unwrap();
        let decoded: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(decoded, json!({ "id": 7 }));
    }

    #[test]
    fn test_build_encodes_query_params() {
        let transport = HttpTransport::with_base_url("http://localhost:8080");
        let request = Request::new(Verb::Get, "/api/users").with_payload(json!({ "page": 2 }), true);

        let built = transport.build(&request).unwrap();
        assert_eq!(built.url().query(), Some("page=2"));
        assert!(built.body().is_none());
    }

    #[test]
    fn test_nested_query_params_fail_to_encode() {
        let transport = HttpTransport::with_base_url("http://localhost:8080");
        let nested = Request::new(Verb::Get, "/api/users").with_payload(json!({ "filter": { "age": 3 } }), true);
        let listed = Request::new(Verb::Get, "/api/users").with_payload(json!([1, 2]), true);

        assert!(matches!(transport.build(&nested), Err(TransportError::Http(_))));
        assert!(matches!(transport.build(&listed), Err(TransportError::Http(_))));
    }

    #[test]
    fn test_absolute_template_ignores_base_url() {
        let transport = HttpTransport::with_base_url("http://localhost:8080");
        let request = Request::new(Verb::Get, "https://api.example.com/users");

        let built = transport.build(&request).unwrap();
        assert_eq!(built.url().as_str(), "https://api.example.com/users");
    }
}
