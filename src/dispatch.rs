//! # Dispatch Orchestrator
//!
//! Invoking a resource operation yields a [`Dispatchable`]. Running it against a
//! [`Dispatcher`] (the store boundary: `dispatch` + `get_state`) performs the
//! operation:
//!
//! 1. **Cache**: a cached `list` operation whose collection is already in the store emits
//!    the primary notification with that collection and skips the network.
//! 2. **Before**: `modify_before` shapes the outgoing payload, then the before
//!    hook is emitted with it.
//! 3. **Call**: the [`Transport`] receives the verb, the resolved URL and the
//!    payload (body or query parameters).
//! 4. **After**: the response body (or the original argument with
//!    `use_payload`) goes through `modify_after`, then the primary notification
//!    and the after hook are emitted with the result.
//!
//! A transport failure is returned unchanged and nothing further is emitted.
//! The run suspends only while the transport call is in flight.

use crate::error::ResourceError;
use crate::method::Descriptor;
use crate::notification::{Action, Notification, Notifier};
use crate::record::Record;
use crate::reducer::StoreState;
use crate::transport::{Request, Transport};
use crate::url::resolve_url;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The store boundary the orchestrator writes to and reads from.
#[async_trait]
pub trait Dispatcher<T: Record>: Send + Sync {
    /// Folds one action into the store.
    async fn dispatch_action(&self, action: Action<T>) -> Result<(), ResourceError>;

    /// Current store snapshot.
    async fn get_state(&self) -> Result<StoreState<T>, ResourceError>;
}

/// A custom operation: called directly with the first argument, its result is
/// returned uninterpreted.
pub type CustomOperation<T> = Arc<dyn Fn(Value) -> Dispatchable<T> + Send + Sync>;

/// Deferred asynchronous work handed the dispatcher when run.
pub type Thunk<T> =
    Box<dyn FnOnce(Arc<dyn Dispatcher<T>>) -> BoxFuture<'static, Result<(), ResourceError>> + Send>;

/// Anything the store runtime knows how to execute.
pub enum Dispatchable<T: Record> {
    Action(Action<T>),
    Call(PendingCall<T>),
    Thunk(Thunk<T>),
}

impl<T: Record> Dispatchable<T> {
    pub fn thunk<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Arc<dyn Dispatcher<T>>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ResourceError>> + Send + 'static,
    {
        Dispatchable::Thunk(Box::new(move |dispatcher: Arc<dyn Dispatcher<T>>| f(dispatcher).boxed()))
    }

    pub async fn run(self, dispatcher: Arc<dyn Dispatcher<T>>) -> Result<(), ResourceError> {
        match self {
            Dispatchable::Action(action) => dispatcher.dispatch_action(action).await,
            Dispatchable::Call(call) => call.run(dispatcher.as_ref()).await,
            Dispatchable::Thunk(thunk) => thunk(dispatcher).await,
        }
    }
}

impl<T: Record> From<Action<T>> for Dispatchable<T> {
    fn from(action: Action<T>) -> Self {
        Dispatchable::Action(action)
    }
}

impl<T: Record> From<Notification<T>> for Dispatchable<T> {
    fn from(notification: Notification<T>) -> Self {
        Dispatchable::Action(Action::Crud(notification))
    }
}

impl<T: Record> fmt::Debug for Dispatchable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatchable::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Dispatchable::Call(call) => f.debug_tuple("Call").field(call).finish(),
            Dispatchable::Thunk(_) => f.write_str("Thunk(..)"),
        }
    }
}

/// A bound server call, carrying its resolved descriptor and arguments as data.
pub struct PendingCall<T: Record> {
    pub resource: String,
    pub operation: String,
    pub descriptor: Arc<Descriptor<T>>,
    pub notifier: Notifier<T>,
    /// Only the first argument is used; the rest are accepted and ignored.
    pub args: Vec<Value>,
    transport: Arc<dyn Transport>,
}

impl<T: Record> fmt::Debug for PendingCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("resource", &self.resource)
            .field("operation", &self.operation)
            .field("descriptor", &self.descriptor)
            .field("args", &self.args)
            .finish()
    }
}

impl<T: Record> PendingCall<T> {
    pub fn new(
        resource: impl Into<String>,
        operation: impl Into<String>,
        descriptor: Arc<Descriptor<T>>,
        notifier: Notifier<T>,
        args: Vec<Value>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            resource: resource.into(),
            operation: operation.into(),
            descriptor,
            notifier,
            args,
            transport,
        }
    }

    #[instrument(skip_all, fields(resource = %self.resource, operation = %self.operation))]
    pub async fn run(self, dispatcher: &dyn Dispatcher<T>) -> Result<(), ResourceError> {
        let first = self.args.first().cloned().unwrap_or(Value::Null);
        debug!(payload = %first, "Dispatching");

        if self.operation == "list" && self.descriptor.cache {
            let state = dispatcher.get_state().await?;
            if let Some(cached) = state.collection(&self.resource) {
                let items: Vec<T> = cached.iter().cloned().collect();
                info!(size = items.len(), "Served from store");
                return self.emit_cached(dispatcher, items).await;
            }
        }

        let outgoing = match &self.descriptor.modify_before {
            Some(modify) => modify(first.clone()),
            None => first.clone(),
        };
        if let Some(action) = self.notifier.before(&outgoing) {
            dispatcher.dispatch_action(action).await?;
        }

        let url = resolve_url(&self.descriptor.url, &outgoing);
        let request = Request::new(self.descriptor.verb, url).with_payload(outgoing, self.descriptor.as_params);
        info!(verb = %request.verb, url = %request.url, "Sending request");

        let response = match self.transport.request(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Request failed");
                return Err(e.into());
            }
        };

        let received = if self.descriptor.use_payload { first } else { response };
        let received = match &self.descriptor.modify_after {
            Some(modify) => modify(received),
            None => received,
        };

        let notification = self
            .notifier
            .notify(received.clone())
            .map_err(|source| ResourceError::Decode {
                operation: self.operation.clone(),
                source,
            })?;
        dispatcher.dispatch_action(Action::Crud(notification)).await?;

        if let Some(action) = self.notifier.after(&received) {
            dispatcher.dispatch_action(action).await?;
        }
        Ok(())
    }

    async fn emit_cached(&self, dispatcher: &dyn Dispatcher<T>, items: Vec<T>) -> Result<(), ResourceError> {
        let after = match &self.notifier.after {
            Some(hook) => Some(hook(&serde_json::to_value(&items).map_err(ResourceError::Encode)?)),
            None => None,
        };

        let notification = self.notifier.notifications().list(items);
        dispatcher.dispatch_action(Action::Crud(notification)).await?;

        if let Some(action) = after {
            dispatcher.dispatch_action(action).await?;
        }
        Ok(())
    }
}
