//! # Mock Framework
//!
//! Test doubles for exercising resources without a network or a running store.
//!
//! - [`MockTransport`]: queue expected requests with a fluent builder, get the
//!   canned responses back in order, then [`verify`](MockTransport::verify).
//! - [`RecordingDispatcher`]: a store stand-in that records every dispatched
//!   action and serves a fixed state to the cache check.
//!
//! # Example
//! ```ignore
//! let transport = MockTransport::new();
//! transport.expect(Verb::Get, "/api/users").return_ok(json!([{ "id": 1 }]));
//!
//! let users = make_resource("users", "/api/users", Arc::new(transport.clone()))?;
//! let store = RecordingDispatcher::new(StoreState::new());
//! store.dispatch(users.list()?).await?;
//!
//! transport.verify(); // Ensures all expectations were met
//! ```

use crate::dispatch::{Dispatchable, Dispatcher};
use crate::error::ResourceError;
use crate::method::Verb;
use crate::notification::Action;
use crate::record::Record;
use crate::reducer::StoreState;
use crate::transport::{Request, Transport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// One expected request and the response to return for it.
struct Expectation {
    verb: Verb,
    url: String,
    response: Result<Value, TransportError>,
}

/// A transport that answers from a queue of expectations.
///
/// Requests must arrive in the order expectations were registered. A request
/// with no expectation left, or with a different verb or URL, panics.
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    /// Creates a new mock transport with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a request with `verb` to the resolved `url`.
    pub fn expect(&self, verb: Verb, url: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            verb,
            url: url.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: Request) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let expectation = self.expectations.lock().unwrap().pop_front();
        match expectation {
            Some(exp) if exp.verb == request.verb && exp.url == request.url => exp.response,
            Some(exp) => panic!(
                "Unexpected request {} {}, expected {} {}",
                request.verb, request.url, exp.verb, exp.url
            ),
            None => panic!("Unexpected request {} {}, no expectation left", request.verb, request.url),
        }
    }
}

/// Builder for transport expectations.
pub struct ExpectationBuilder {
    verb: Verb,
    url: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    /// Sets the expectation to return a successful response body.
    pub fn return_ok(self, body: Value) {
        self.push(Ok(body));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Value, TransportError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            verb: self.verb,
            url: self.url,
            response,
        });
    }
}

// =============================================================================
// RECORDING STORE
// =============================================================================

/// A dispatcher that records actions instead of reducing them.
///
/// `get_state` always returns the state it was created with.
pub struct RecordingDispatcher<T: Record> {
    state: StoreState<T>,
    actions: Arc<Mutex<Vec<Action<T>>>>,
}

impl<T: Record> Clone for RecordingDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<T: Record> RecordingDispatcher<T> {
    pub fn new(state: StoreState<T>) -> Self {
        Self {
            state,
            actions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every action dispatched so far, in order.
    pub fn actions(&self) -> Vec<Action<T>> {
        self.actions.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.actions.lock().unwrap().clear();
    }

    pub async fn dispatch(&self, dispatchable: impl Into<Dispatchable<T>>) -> Result<(), ResourceError> {
        let dispatchable: Dispatchable<T> = dispatchable.into();
        dispatchable.run(Arc::new(self.clone())).await
    }
}

#[async_trait]
impl<T: Record> Dispatcher<T> for RecordingDispatcher<T> {
    async fn dispatch_action(&self, action: Action<T>) -> Result<(), ResourceError> {
        self.actions.lock().unwrap().push(action);
        Ok(())
    }

    async fn get_state(&self) -> Result<StoreState<T>, ResourceError> {
        Ok(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_transport_with_expectations() {
        let transport = MockTransport::new();
        transport.expect(Verb::Get, "/api/users").return_ok(json!([]));
        transport
            .expect(Verb::Delete, "/api/users/1")
            .return_err(TransportError::Other("gone".into()));

        let listed = transport.request(Request::new(Verb::Get, "/api/users")).await;
        assert_eq!(listed.unwrap(), json!([]));

        let deleted = transport.request(Request::new(Verb::Delete, "/api/users/1")).await;
        assert!(matches!(deleted, Err(TransportError::Other(msg)) if msg == "gone"));

        assert_eq!(transport.requests().len(), 2);
        transport.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected request")]
    async fn test_mock_transport_rejects_unexpected_request() {
        let transport = MockTransport::new();
        transport.expect(Verb::Get, "/api/users").return_ok(json!([]));

        let _ = transport.request(Request::new(Verb::Post, "/api/users")).await;
    }

    #[test]
    #[should_panic(expected = "Not all expectations were met")]
    fn test_verify_reports_pending_expectations() {
        let transport = MockTransport::new();
        transport.expect(Verb::Get, "/api/users").return_ok(json!([]));
        transport.verify();
    }
}
