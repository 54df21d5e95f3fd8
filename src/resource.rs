//! # Resources
//!
//! [`make_resource`] binds a named collection to its configuration and a
//! transport. The resulting [`Resource`] exposes the raw notification factories,
//! the resolved method table and one callable operation per method name.

use crate::config::ResourceConfig;
use crate::dispatch::{Dispatchable, PendingCall};
use crate::error::ResourceError;
use crate::method::{bind_methods, Method};
use crate::notification::{attach_hooks, make_notifications, Notifications, Notifier};
use crate::record::Record;
use crate::transport::Transport;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct Resource<T: Record> {
    name: String,
    notifications: Notifications<T>,
    methods: IndexMap<String, Method<T>>,
    notifiers: IndexMap<String, Notifier<T>>,
    transport: Arc<dyn Transport>,
}

/// Builds the resource `name` from a base URL or an explicit configuration.
///
/// Fails only when an explicitly declared extra operation is incomplete.
pub fn make_resource<T: Record>(
    name: impl Into<String>,
    config: impl Into<ResourceConfig<T>>,
    transport: Arc<dyn Transport>,
) -> Result<Resource<T>, ResourceError> {
    let name = name.into();
    let methods = bind_methods(config.into())?;
    let notifications = make_notifications(name.clone());
    let notifiers = attach_hooks(&notifications, &methods);

    debug!(resource = %name, methods = ?methods.keys().collect::<Vec<_>>(), "Resource bound");
    Ok(Resource {
        name,
        notifications,
        methods,
        notifiers,
        transport,
    })
}

impl<T: Record> Resource<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Notification factories without hooks.
    pub fn notifications(&self) -> &Notifications<T> {
        &self.notifications
    }

    pub fn methods(&self) -> &IndexMap<String, Method<T>> {
        &self.methods
    }

    pub fn method(&self, operation: &str) -> Option<&Method<T>> {
        self.methods.get(operation)
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Invokes `operation` with a single argument.
    pub fn call(&self, operation: &str, payload: Value) -> Result<Dispatchable<T>, ResourceError> {
        self.call_with(operation, vec![payload])
    }

    /// Invokes `operation`. Custom operations receive the first argument; remote
    /// operations return a pending call to run against a dispatcher. Only the
    /// first argument is used as payload; the rest are ignored.
    pub fn call_with(&self, operation: &str, args: Vec<Value>) -> Result<Dispatchable<T>, ResourceError> {
        let method = self
            .methods
            .get(operation)
            .ok_or_else(|| ResourceError::UnknownOperation(operation.to_string()))?;

        match method {
            Method::Custom(f) => Ok(f(args.into_iter().next().unwrap_or(Value::Null))),
            Method::Remote(descriptor) => {
                let notifier = self
                    .notifiers
                    .get(operation)
                    .cloned()
                    .unwrap_or_else(|| Notifier::new(self.notifications.clone(), descriptor.kind));

                Ok(Dispatchable::Call(PendingCall::new(
                    self.name.clone(),
                    operation,
                    descriptor.clone(),
                    notifier,
                    args,
                    self.transport.clone(),
                )))
            }
        }
    }

    pub fn list(&self) -> Result<Dispatchable<T>, ResourceError> {
        self.call_with("list", Vec::new())
    }

    pub fn read(&self, id: impl Into<Value>) -> Result<Dispatchable<T>, ResourceError> {
        self.call("read", id.into())
    }

    pub fn create(&self, item: Value) -> Result<Dispatchable<T>, ResourceError> {
        self.call("create", item)
    }

    pub fn update(&self, item: Value) -> Result<Dispatchable<T>, ResourceError> {
        self.call("update", item)
    }

    pub fn delete(&self, id: impl Into<Value>) -> Result<Dispatchable<T>, ResourceError> {
        self.call("delete", id.into())
    }
}

impl<T: Record> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish()
    }
}
