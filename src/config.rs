//! # Resource Configuration
//!
//! A resource is configured in one of three ways:
//!
//! - **Implicit**: a base URL string. The five standard operations are derived from it.
//! - **Explicit**: [`ResourceConfig::builder`], with per-operation [`MethodConfig`]
//!   overrides and custom operations (functions).
//! - **Manifest**: a JSON document parsed by [`ResourceManifest::from_json`].
//!   It cannot declare functions, so it only covers URLs, verbs and flags.
//!
//! ```json
//! {
//!   "baseUrl": "/api/docs",
//!   "methods": {
//!     "delete": { "url": "/api/docs/:id/delete", "type": "POST", "usePayload": true },
//!     "updateBatch": { "url": "/api/docs/batch", "type": "PUT" }
//!   }
//! }
//! ```

use crate::dispatch::{CustomOperation, Dispatchable, Dispatcher};
use crate::error::ResourceError;
use crate::method::{MethodConfig, Verb};
use crate::notification::{Action, ChangeKind};
use crate::record::Record;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// One explicitly declared operation.
pub enum OperationConfig<T: Record> {
    /// Used verbatim as the operation; never bound to the transport.
    Custom(CustomOperation<T>),
    /// Override merged onto the default of the same name.
    Remote(MethodConfig<T>),
}

/// Explicit configuration: optional base URL plus declared operations.
pub struct ExplicitConfig<T: Record> {
    pub base_url: Option<String>,
    pub operations: IndexMap<String, OperationConfig<T>>,
}

impl<T: Record> Default for ExplicitConfig<T> {
    fn default() -> Self {
        Self {
            base_url: None,
            operations: IndexMap::new(),
        }
    }
}

pub enum ResourceConfig<T: Record> {
    Url(String),
    Explicit(ExplicitConfig<T>),
}

impl<T: Record> ResourceConfig<T> {
    pub fn builder() -> ResourceConfigBuilder<T> {
        ResourceConfigBuilder {
            config: ExplicitConfig::default(),
        }
    }
}

impl<T: Record> From<&str> for ResourceConfig<T> {
    fn from(url: &str) -> Self {
        ResourceConfig::Url(url.to_string())
    }
}

impl<T: Record> From<String> for ResourceConfig<T> {
    fn from(url: String) -> Self {
        ResourceConfig::Url(url)
    }
}

impl<T: Record> From<ExplicitConfig<T>> for ResourceConfig<T> {
    fn from(config: ExplicitConfig<T>) -> Self {
        ResourceConfig::Explicit(config)
    }
}

/// Fluent builder for an explicit [`ResourceConfig`].
///
/// ```ignore
/// let config = ResourceConfig::<Value>::builder()
///     .base_url("/api/docs")
///     .method("delete", MethodConfig::new().verb(Verb::Post).use_payload(true))
///     .custom("select", |id| Action::custom("SELECT", id))
///     .build();
/// ```
pub struct ResourceConfigBuilder<T: Record> {
    config: ExplicitConfig<T>,
}

impl<T: Record> ResourceConfigBuilder<T> {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn method(mut self, name: impl Into<String>, method: MethodConfig<T>) -> Self {
        self.config
            .operations
            .insert(name.into(), OperationConfig::Remote(method));
        self
    }

    /// A synchronous custom operation returning one action.
    pub fn custom<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Action<T> + Send + Sync + 'static,
    {
        self.custom_dispatchable(name, move |payload| Dispatchable::Action(f(payload)))
    }

    /// An asynchronous custom operation, run with the dispatcher.
    pub fn custom_async<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, Arc<dyn Dispatcher<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ResourceError>> + Send + 'static,
    {
        let f = Arc::new(f);
        self.custom_dispatchable(name, move |payload| {
            let f = f.clone();
            Dispatchable::thunk(move |dispatcher| f(payload, dispatcher))
        })
    }

    pub fn custom_dispatchable<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Dispatchable<T> + Send + Sync + 'static,
    {
        self.config
            .operations
            .insert(name.into(), OperationConfig::Custom(Arc::new(f)));
        self
    }

    pub fn build(self) -> ResourceConfig<T> {
        ResourceConfig::Explicit(self.config)
    }
}

/// Declarative configuration loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceManifest {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub methods: IndexMap<String, MethodManifest>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodManifest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub verb: Option<Verb>,
    #[serde(default)]
    pub cache: Option<bool>,
    #[serde(default)]
    pub use_payload: Option<bool>,
    #[serde(default)]
    pub as_params: Option<bool>,
    #[serde(default)]
    pub kind: Option<ChangeKind>,
}

impl ResourceManifest {
    pub fn from_json(json: &str) -> Result<Self, ResourceError> {
        serde_json::from_str(json).map_err(ResourceError::Manifest)
    }

    pub fn into_config<T: Record>(self) -> ResourceConfig<T> {
        let operations = self
            .methods
            .into_iter()
            .map(|(name, method)| (name, OperationConfig::Remote(method.into_method_config())))
            .collect();

        ResourceConfig::Explicit(ExplicitConfig {
            base_url: self.base_url,
            operations,
        })
    }
}

impl MethodManifest {
    fn into_method_config<T: Record>(self) -> MethodConfig<T> {
        MethodConfig {
            kind: self.kind,
            url: self.url,
            verb: self.verb,
            cache: self.cache,
            use_payload: self.use_payload,
            as_params: self.as_params,
            ..MethodConfig::default()
        }
    }
}

impl<T: Record> From<ResourceManifest> for ResourceConfig<T> {
    fn from(manifest: ResourceManifest) -> Self {
        manifest.into_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::bind_methods;

    #[test]
    fn test_manifest_parses_camel_case_fields() {
        let manifest = ResourceManifest::from_json(
            r#"{
                "baseUrl": "/api/docs",
                "methods": {
                    "delete": { "url": "/api/docs/:id/delete", "type": "post", "usePayload": true },
                    "search": { "url": "/api/docs/search", "kind": "list", "asParams": true }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.base_url.as_deref(), Some("/api/docs"));
        let delete = &manifest.methods["delete"];
        assert_eq!(delete.verb, Some(Verb::Post));
        assert_eq!(delete.use_payload, Some(true));
        assert_eq!(manifest.methods["search"].kind, Some(ChangeKind::List));
    }

    #[test]
    fn test_manifest_binds_like_explicit_config() {
        let manifest = ResourceManifest::from_json(
            r#"{ "baseUrl": "/api/docs", "methods": { "update": { "type": "PATCH" } } }"#,
        )
        .unwrap();

        let methods = bind_methods::<Value>(manifest.into()).unwrap();
        let update = methods["update"].descriptor().unwrap();
        assert_eq!(update.url, "/api/docs/:id");
        assert_eq!(update.verb, Verb::Patch);
        assert!(methods["list"].descriptor().unwrap().cache);
    }

    #[test]
    fn test_invalid_manifest_is_rejected() {
        let unknown_verb = ResourceManifest::from_json(r#"{ "methods": { "list": { "type": "FETCH" } } }"#);
        assert!(matches!(unknown_verb, Err(ResourceError::Manifest(_))));

        let unknown_kind = ResourceManifest::from_json(r#"{ "methods": { "x": { "url": "/x", "kind": "upsert" } } }"#);
        assert!(matches!(unknown_kind, Err(ResourceError::Manifest(_))));
    }

    #[test]
    fn test_builder_keeps_declaration_order() {
        let config = ResourceConfig::<Value>::builder()
            .base_url("/api/docs")
            .custom("select", |id| Action::custom("SELECT", id))
            .method("archive", MethodConfig::new().kind(ChangeKind::Update).url("/api/docs/:id/archive"))
            .build();

        let methods = bind_methods(config).unwrap();
        let names: Vec<&str> = methods.keys().map(String::as_str).collect();
        assert_eq!(names, ["list", "read", "create", "update", "delete", "select", "archive"]);
    }
}
