//! # Operation Binder
//!
//! Turns a [`ResourceConfig`] into one [`Method`] per operation name. A remote
//! method is a fully populated [`Descriptor`]: every recognized field of the
//! explicit override is taken when present and inherited from the implicit
//! default otherwise. Custom operations are passed through untouched.

use crate::config::{OperationConfig, ResourceConfig};
use crate::dispatch::CustomOperation;
use crate::error::ResourceError;
use crate::notification::{Action, ChangeKind, Hook};
use crate::record::Record;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

/// Payload transform applied before sending or after receiving.
pub type Modifier = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// HTTP verb of a remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "PATCH" => Ok(Verb::Patch),
            "DELETE" => Ok(Verb::Delete),
            _ => Err(format!("unsupported HTTP verb: {s}")),
        }
    }
}

impl TryFrom<String> for Verb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Verb> for String {
    fn from(verb: Verb) -> Self {
        verb.as_str().to_string()
    }
}

/// Resolved configuration of one remote operation.
pub struct Descriptor<T: Record> {
    /// Kind of the primary notification emitted on success.
    pub kind: ChangeKind,
    /// URL template with `:field` placeholders.
    pub url: String,
    pub verb: Verb,
    /// `list` only: serve from the store when the collection is present.
    pub cache: bool,
    /// Notify with the original argument instead of the response body.
    pub use_payload: bool,
    /// Send the payload as query parameters instead of the body. Only flat
    /// objects encode; see [`Request::with_payload`](crate::transport::Request::with_payload).
    pub as_params: bool,
    pub modify_before: Option<Modifier>,
    pub modify_after: Option<Modifier>,
    pub hook_before: Option<Hook<T>>,
    pub hook_after: Option<Hook<T>>,
}

impl<T: Record> Descriptor<T> {
    pub fn new(kind: ChangeKind, url: impl Into<String>, verb: Verb) -> Self {
        Self {
            kind,
            url: url.into(),
            verb,
            cache: false,
            use_payload: false,
            as_params: false,
            modify_before: None,
            modify_after: None,
            hook_before: None,
            hook_after: None,
        }
    }

    fn cached(mut self) -> Self {
        self.cache = true;
        self
    }
}

impl<T: Record> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            url: self.url.clone(),
            verb: self.verb,
            cache: self.cache,
            use_payload: self.use_payload,
            as_params: self.as_params,
            modify_before: self.modify_before.clone(),
            modify_after: self.modify_after.clone(),
            hook_before: self.hook_before.clone(),
            hook_after: self.hook_after.clone(),
        }
    }
}

impl<T: Record> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("verb", &self.verb)
            .field("cache", &self.cache)
            .field("use_payload", &self.use_payload)
            .field("as_params", &self.as_params)
            .field("modify_before", &self.modify_before.is_some())
            .field("modify_after", &self.modify_after.is_some())
            .field("hook_before", &self.hook_before.is_some())
            .field("hook_after", &self.hook_after.is_some())
            .finish()
    }
}

/// Explicit override for one operation. Absent fields inherit the default.
pub struct MethodConfig<T: Record> {
    pub kind: Option<ChangeKind>,
    pub url: Option<String>,
    pub verb: Option<Verb>,
    pub cache: Option<bool>,
    pub use_payload: Option<bool>,
    pub as_params: Option<bool>,
    pub modify_before: Option<Modifier>,
    pub modify_after: Option<Modifier>,
    pub hook_before: Option<Hook<T>>,
    pub hook_after: Option<Hook<T>>,
}

impl<T: Record> Default for MethodConfig<T> {
    fn default() -> Self {
        Self {
            kind: None,
            url: None,
            verb: None,
            cache: None,
            use_payload: None,
            as_params: None,
            modify_before: None,
            modify_after: None,
            hook_before: None,
            hook_after: None,
        }
    }
}

impl<T: Record> MethodConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ChangeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = Some(verb);
        self
    }

    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn use_payload(mut self, use_payload: bool) -> Self {
        self.use_payload = Some(use_payload);
        self
    }

    pub fn as_params(mut self, as_params: bool) -> Self {
        self.as_params = Some(as_params);
        self
    }

    pub fn modify_before(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.modify_before = Some(Arc::new(f));
        self
    }

    pub fn modify_after(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.modify_after = Some(Arc::new(f));
        self
    }

    pub fn hook_before(mut self, f: impl Fn(&Value) -> Action<T> + Send + Sync + 'static) -> Self {
        self.hook_before = Some(Arc::new(f));
        self
    }

    pub fn hook_after(mut self, f: impl Fn(&Value) -> Action<T> + Send + Sync + 'static) -> Self {
        self.hook_after = Some(Arc::new(f));
        self
    }
}

/// The bound form of one operation.
pub enum Method<T: Record> {
    /// Server call described by a resolved descriptor.
    Remote(Arc<Descriptor<T>>),
    /// Caller-supplied function, used verbatim as the operation.
    Custom(CustomOperation<T>),
}

impl<T: Record> Clone for Method<T> {
    fn clone(&self) -> Self {
        match self {
            Method::Remote(descriptor) => Method::Remote(descriptor.clone()),
            Method::Custom(operation) => Method::Custom(operation.clone()),
        }
    }
}

impl<T: Record> fmt::Debug for Method<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Remote(descriptor) => f.debug_tuple("Remote").field(descriptor).finish(),
            Method::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<T: Record> Method<T> {
    pub fn descriptor(&self) -> Option<&Descriptor<T>> {
        match self {
            Method::Remote(descriptor) => Some(descriptor),
            Method::Custom(_) => None,
        }
    }
}

/// The five standard operations implied by a base URL.
///
/// Collection-scoped operations use `base_url` verbatim, item-scoped ones
/// `<base_url>/:id`. Only `list` is cached.
pub fn default_methods<T: Record>(base_url: &str) -> IndexMap<String, Descriptor<T>> {
    let item_url = format!("{base_url}/:id");

    IndexMap::from([
        ("list".to_string(), Descriptor::new(ChangeKind::List, base_url, Verb::Get).cached()),
        ("read".to_string(), Descriptor::new(ChangeKind::Read, item_url.as_str(), Verb::Get)),
        ("create".to_string(), Descriptor::new(ChangeKind::Create, base_url, Verb::Post)),
        ("update".to_string(), Descriptor::new(ChangeKind::Update, item_url.as_str(), Verb::Put)),
        ("delete".to_string(), Descriptor::new(ChangeKind::Delete, item_url.as_str(), Verb::Delete)),
    ])
}

/// Merges an explicit override onto the default of the same operation.
///
/// Without a default, `url` is required and `kind` must be set or be implied by
/// the operation name (`createBatch`, ...). The verb falls back to GET.
pub fn resolve_method<T: Record>(
    name: &str,
    explicit: MethodConfig<T>,
    default: Option<Descriptor<T>>,
) -> Result<Descriptor<T>, ResourceError> {
    let incomplete = |missing| ResourceError::IncompleteMethod {
        operation: name.to_string(),
        missing,
    };

    let kind = explicit
        .kind
        .or(default.as_ref().map(|d| d.kind))
        .or_else(|| ChangeKind::from_operation_name(name))
        .ok_or_else(|| incomplete("kind"))?;

    let (url, verb, cache, use_payload, as_params) = match &default {
        Some(d) => (Some(d.url.clone()), d.verb, d.cache, d.use_payload, d.as_params),
        None => (None, Verb::Get, false, false, false),
    };
    let url = explicit.url.or(url).ok_or_else(|| incomplete("url"))?;

    let (modify_before, modify_after, hook_before, hook_after) = match default {
        Some(d) => (d.modify_before, d.modify_after, d.hook_before, d.hook_after),
        None => (None, None, None, None),
    };

    Ok(Descriptor {
        kind,
        url,
        verb: explicit.verb.unwrap_or(verb),
        cache: explicit.cache.unwrap_or(cache),
        use_payload: explicit.use_payload.unwrap_or(use_payload),
        as_params: explicit.as_params.unwrap_or(as_params),
        modify_before: explicit.modify_before.or(modify_before),
        modify_after: explicit.modify_after.or(modify_after),
        hook_before: explicit.hook_before.or(hook_before),
        hook_after: explicit.hook_after.or(hook_after),
    })
}

/// Derives the method table of a resource.
///
/// Standard operations keep their default position; explicitly declared extra
/// operations follow in declaration order.
pub fn bind_methods<T: Record>(
    config: ResourceConfig<T>,
) -> Result<IndexMap<String, Method<T>>, ResourceError> {
    let (base_url, mut operations) = match config {
        ResourceConfig::Url(url) => (url, IndexMap::new()),
        ResourceConfig::Explicit(explicit) => {
            (explicit.base_url.unwrap_or_default(), explicit.operations)
        }
    };

    let mut methods = IndexMap::new();

    for (name, default) in default_methods::<T>(&base_url) {
        let method = match operations.shift_remove(&name) {
            Some(OperationConfig::Custom(operation)) => Method::Custom(operation),
            Some(OperationConfig::Remote(explicit)) => {
                Method::Remote(Arc::new(resolve_method(&name, explicit, Some(default))?))
            }
            None => Method::Remote(Arc::new(default)),
        };
        methods.insert(name, method);
    }

    for (name, operation) in operations {
        let method = match operation {
            OperationConfig::Custom(operation) => Method::Custom(operation),
            OperationConfig::Remote(explicit) => {
                Method::Remote(Arc::new(resolve_method(&name, explicit, None)?))
            }
        };
        methods.insert(name, method);
    }

    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_methods_from_base_url() {
        let methods = default_methods::<Value>("/api/users");

        let list = &methods["list"];
        assert_eq!(list.url, "/api/users");
        assert_eq!(list.verb, Verb::Get);
        assert!(list.cache);

        let update = &methods["update"];
        assert_eq!(update.url, "/api/users/:id");
        assert_eq!(update.verb, Verb::Put);
        assert!(!update.cache);

        let names: Vec<&str> = methods.keys().map(String::as_str).collect();
        assert_eq!(names, ["list", "read", "create", "update", "delete"]);
    }

    #[test]
    fn test_explicit_values_win_absent_values_inherit() {
        let defaults = default_methods::<Value>("/api/docs");
        let explicit = MethodConfig::new()
            .url("/api/docs/:id/delete")
            .verb(Verb::Post)
            .use_payload(true);

        let resolved = resolve_method("delete", explicit, Some(defaults["delete"].clone())).unwrap();
        assert_eq!(resolved.kind, ChangeKind::Delete);
        assert_eq!(resolved.url, "/api/docs/:id/delete");
        assert_eq!(resolved.verb, Verb::Post);
        assert!(resolved.use_payload);
        assert!(!resolved.as_params);
        assert!(resolved.modify_after.is_none());
    }

    #[test]
    fn test_override_keeps_default_cache_flag() {
        let defaults = default_methods::<Value>("/api/docs");
        let explicit = MethodConfig::new().modify_after(|v| v);

        let resolved = resolve_method("list", explicit, Some(defaults["list"].clone())).unwrap();
        assert!(resolved.cache);
        assert!(resolved.modify_after.is_some());
        assert_eq!(resolved.url, "/api/docs");
    }

    #[test]
    fn test_batch_name_implies_kind() {
        let resolved = resolve_method::<Value>(
            "updateBatch",
            MethodConfig::new().url("/api/docs/batch").verb(Verb::Patch),
            None,
        )
        .unwrap();
        assert_eq!(resolved.kind, ChangeKind::UpdateBatch);
        assert_eq!(resolved.verb, Verb::Patch);
    }

    #[test]
    fn test_incomplete_extra_method_is_rejected() {
        let missing_kind = resolve_method::<Value>("archive", MethodConfig::new().url("/a"), None);
        assert!(matches!(
            missing_kind,
            Err(ResourceError::IncompleteMethod { missing: "kind", .. })
        ));

        let missing_url =
            resolve_method::<Value>("archive", MethodConfig::new().kind(ChangeKind::Update), None);
        assert!(matches!(
            missing_url,
            Err(ResourceError::IncompleteMethod { missing: "url", .. })
        ));
    }

    #[test]
    fn test_verb_parses_case_insensitively() {
        assert_eq!("put".parse::<Verb>(), Ok(Verb::Put));
        assert_eq!(serde_json::from_value::<Verb>(json!("Delete")).unwrap(), Verb::Delete);
        assert!("FETCH".parse::<Verb>().is_err());
    }
}
