//! # Notification Model
//!
//! A [`Notification`] describes what happened to one named collection. Its
//! payload is a [`Change`], a tagged variant whose shape is fixed by the kind:
//! a whole collection for `List`, one item for `Create`/`Update`, an identifier
//! for `Delete`, and so on. The reducer matches on it exhaustively.
//!
//! [`make_notifications`] returns the per-kind factories for one resource and
//! [`attach_hooks`] pairs each factory with the `before`/`after` hooks configured
//! for the matching operation.

use crate::method::Method;
use crate::record::Record;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::sync::Arc;

/// Side-notification factory run around the primary notification of an operation.
pub type Hook<T> = Arc<dyn Fn(&Value) -> Action<T> + Send + Sync>;

/// The fixed vocabulary of notification kinds.
///
/// Serialized as the operation name (`"list"`, `"updateBatch"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChangeKind {
    List,
    Read,
    Create,
    Update,
    Delete,
    CreateBatch,
    UpdateBatch,
    DeleteBatch,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 8] = [
        ChangeKind::List,
        ChangeKind::Read,
        ChangeKind::Create,
        ChangeKind::Update,
        ChangeKind::Delete,
        ChangeKind::CreateBatch,
        ChangeKind::UpdateBatch,
        ChangeKind::DeleteBatch,
    ];

    /// Name of the operation that emits this kind by default.
    pub fn operation_name(self) -> &'static str {
        match self {
            ChangeKind::List => "list",
            ChangeKind::Read => "read",
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
            ChangeKind::CreateBatch => "createBatch",
            ChangeKind::UpdateBatch => "updateBatch",
            ChangeKind::DeleteBatch => "deleteBatch",
        }
    }

    pub fn from_operation_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.operation_name() == name)
    }

    pub fn action_type(self) -> &'static str {
        match self {
            ChangeKind::List => "CRUD_LIST",
            ChangeKind::Read => "CRUD_READ",
            ChangeKind::Create => "CRUD_CREATE",
            ChangeKind::Update => "CRUD_UPDATE",
            ChangeKind::Delete => "CRUD_DELETE",
            ChangeKind::CreateBatch => "CRUD_CREATE_BATCH",
            ChangeKind::UpdateBatch => "CRUD_UPDATE_BATCH",
            ChangeKind::DeleteBatch => "CRUD_DELETE_BATCH",
        }
    }

    /// Decodes a wire value into the payload this kind carries.
    pub fn decode<T: Record>(self, value: Value) -> Result<Change<T>, serde_json::Error> {
        Ok(match self {
            ChangeKind::List => Change::List(serde_json::from_value(value)?),
            ChangeKind::Read => Change::Read(serde_json::from_value(value)?),
            ChangeKind::Create => Change::Create(serde_json::from_value(value)?),
            ChangeKind::Update => Change::Update(serde_json::from_value(value)?),
            ChangeKind::Delete => Change::Delete(serde_json::from_value(value)?),
            ChangeKind::CreateBatch => Change::CreateBatch(serde_json::from_value(value)?),
            ChangeKind::UpdateBatch => Change::UpdateBatch(serde_json::from_value(value)?),
            ChangeKind::DeleteBatch => Change::DeleteBatch(serde_json::from_value(value)?),
        })
    }
}

impl TryFrom<String> for ChangeKind {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::from_operation_name(&name).ok_or_else(|| format!("unknown notification kind: {name}"))
    }
}

impl From<ChangeKind> for String {
    fn from(kind: ChangeKind) -> Self {
        kind.operation_name().to_string()
    }
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_type())
    }
}

/// Kind-specific notification payload.
///
/// `Read` carries the fetched item and has no effect on the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T: Record> {
    List(Vec<T>),
    Read(T),
    Create(T),
    Update(T),
    Delete(T::Id),
    CreateBatch(Vec<T>),
    UpdateBatch(Vec<T>),
    DeleteBatch(Vec<T::Id>),
}

impl<T: Record> Change<T> {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::List(_) => ChangeKind::List,
            Change::Read(_) => ChangeKind::Read,
            Change::Create(_) => ChangeKind::Create,
            Change::Update(_) => ChangeKind::Update,
            Change::Delete(_) => ChangeKind::Delete,
            Change::CreateBatch(_) => ChangeKind::CreateBatch,
            Change::UpdateBatch(_) => ChangeKind::UpdateBatch,
            Change::DeleteBatch(_) => ChangeKind::DeleteBatch,
        }
    }
}

/// A change to the collection named by `resource`.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification<T: Record> {
    pub resource: String,
    pub change: Change<T>,
}

impl<T: Record> Notification<T> {
    pub fn kind(&self) -> ChangeKind {
        self.change.kind()
    }
}

/// Anything the store can be asked to fold.
///
/// Hooks and custom operations may emit `Custom` actions; the collection reducer
/// ignores them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<T: Record> {
    Crud(Notification<T>),
    Custom { kind: String, payload: Value },
}

impl<T: Record> Action<T> {
    pub fn custom(kind: impl Into<String>, payload: Value) -> Self {
        Action::Custom {
            kind: kind.into(),
            payload,
        }
    }

    /// `CRUD_*` type for notifications, the caller's tag for custom actions.
    pub fn type_name(&self) -> &str {
        match self {
            Action::Crud(notification) => notification.kind().action_type(),
            Action::Custom { kind, .. } => kind,
        }
    }
}

impl<T: Record> From<Notification<T>> for Action<T> {
    fn from(notification: Notification<T>) -> Self {
        Action::Crud(notification)
    }
}

/// Per-kind notification factories stamped with one resource name.
#[derive(Debug, Clone)]
pub struct Notifications<T: Record> {
    resource: String,
    _marker: PhantomData<fn() -> T>,
}

/// Returns the notification factories for `resource`.
pub fn make_notifications<T: Record>(resource: impl Into<String>) -> Notifications<T> {
    Notifications {
        resource: resource.into(),
        _marker: PhantomData,
    }
}

impl<T: Record> Notifications<T> {
    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn stamp(&self, change: Change<T>) -> Notification<T> {
        Notification {
            resource: self.resource.clone(),
            change,
        }
    }

    pub fn list(&self, items: Vec<T>) -> Notification<T> {
        self.stamp(Change::List(items))
    }

    pub fn read(&self, item: T) -> Notification<T> {
        self.stamp(Change::Read(item))
    }

    pub fn create(&self, item: T) -> Notification<T> {
        self.stamp(Change::Create(item))
    }

    pub fn update(&self, item: T) -> Notification<T> {
        self.stamp(Change::Update(item))
    }

    pub fn delete(&self, id: T::Id) -> Notification<T> {
        self.stamp(Change::Delete(id))
    }

    pub fn create_batch(&self, items: Vec<T>) -> Notification<T> {
        self.stamp(Change::CreateBatch(items))
    }

    pub fn update_batch(&self, items: Vec<T>) -> Notification<T> {
        self.stamp(Change::UpdateBatch(items))
    }

    pub fn delete_batch(&self, ids: Vec<T::Id>) -> Notification<T> {
        self.stamp(Change::DeleteBatch(ids))
    }

    /// Builds the notification of `kind` from an untyped wire value.
    pub fn from_wire(&self, kind: ChangeKind, value: Value) -> Result<Notification<T>, serde_json::Error> {
        kind.decode(value).map(|change| self.stamp(change))
    }
}

/// A notification factory plus the side notifications configured around it.
#[derive(Clone)]
pub struct Notifier<T: Record> {
    pub before: Option<Hook<T>>,
    pub call: ChangeKind,
    pub after: Option<Hook<T>>,
    notifications: Notifications<T>,
}

impl<T: Record> Notifier<T> {
    pub fn new(notifications: Notifications<T>, call: ChangeKind) -> Self {
        Self {
            before: None,
            call,
            after: None,
            notifications,
        }
    }

    pub fn with_hooks(mut self, before: Option<Hook<T>>, after: Option<Hook<T>>) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    pub fn notifications(&self) -> &Notifications<T> {
        &self.notifications
    }

    /// Builds the primary notification from the final received value.
    pub fn notify(&self, value: Value) -> Result<Notification<T>, serde_json::Error> {
        self.notifications.from_wire(self.call, value)
    }

    pub fn before(&self, payload: &Value) -> Option<Action<T>> {
        self.before.as_ref().map(|hook| hook(payload))
    }

    pub fn after(&self, payload: &Value) -> Option<Action<T>> {
        self.after.as_ref().map(|hook| hook(payload))
    }
}

impl<T: Record> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("resource", &self.notifications.resource())
            .field("call", &self.call)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// Wraps every factory with the hooks of its operation.
///
/// Each of the eight kinds gets a notifier under its operation name, with the
/// hooks of the same-named remote method if there is one. Remote methods under
/// non-standard names get a notifier for their declared kind.
pub fn attach_hooks<T: Record>(
    notifications: &Notifications<T>,
    methods: &IndexMap<String, Method<T>>,
) -> IndexMap<String, Notifier<T>> {
    let mut notifiers = IndexMap::new();

    for kind in ChangeKind::ALL {
        let notifier = Notifier::new(notifications.clone(), kind);
        let notifier = match methods.get(kind.operation_name()) {
            Some(Method::Remote(descriptor)) => notifier.with_hooks(
                descriptor.hook_before.clone(),
                descriptor.hook_after.clone(),
            ),
            _ => notifier,
        };
        notifiers.insert(kind.operation_name().to_string(), notifier);
    }

    for (name, method) in methods {
        if notifiers.contains_key(name) {
            continue;
        }
        if let Method::Remote(descriptor) = method {
            let notifier = Notifier::new(notifications.clone(), descriptor.kind).with_hooks(
                descriptor.hook_before.clone(),
                descriptor.hook_after.clone(),
            );
            notifiers.insert(name.clone(), notifier);
        }
    }

    notifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{default_methods, Method};
    use crate::record::RecordKey;
    use serde_json::json;

    fn users() -> Notifications<Value> {
        make_notifications("users")
    }

    #[test]
    fn test_factories_stamp_resource_and_kind() {
        let list = users().list(vec![json!({ "id": 1 }), json!({ "id": 2 })]);
        assert_eq!(list.resource, "users");
        assert_eq!(list.kind(), ChangeKind::List);

        let read = users().read(json!({ "id": 1 }));
        assert_eq!(read.change, Change::Read(json!({ "id": 1 })));

        let create = users().create(json!({ "id": 1 }));
        assert_eq!(create.kind(), ChangeKind::Create);

        let update = users().update(json!({ "id": 1 }));
        assert_eq!(update.kind(), ChangeKind::Update);

        let delete = users().delete(RecordKey::Int(2));
        assert_eq!(delete.change, Change::Delete(RecordKey::Int(2)));
        assert_eq!(delete.kind().action_type(), "CRUD_DELETE");
    }

    #[test]
    fn test_operation_names_round_trip() {
        for kind in ChangeKind::ALL {
            assert_eq!(ChangeKind::from_operation_name(kind.operation_name()), Some(kind));
        }
        assert_eq!(ChangeKind::from_operation_name("custom"), None);
    }

    #[test]
    fn test_from_wire_rejects_mismatched_shape() {
        // A list notification needs an array
        let result = users().from_wire(ChangeKind::List, json!({ "id": 1 }));
        assert!(result.is_err());

        let batch = users()
            .from_wire(ChangeKind::DeleteBatch, json!([1, 2]))
            .unwrap();
        assert_eq!(batch.change, Change::DeleteBatch(vec![RecordKey::Int(1), RecordKey::Int(2)]));
    }

    #[test]
    fn test_attach_hooks_defaults_to_absent() {
        let methods: IndexMap<String, Method<Value>> = default_methods("/api/users")
            .into_iter()
            .map(|(name, descriptor)| (name, Method::Remote(Arc::new(descriptor))))
            .collect();

        let notifiers = attach_hooks(&users(), &methods);
        assert_eq!(notifiers.len(), 8);

        let list = &notifiers["list"];
        assert_eq!(list.call, ChangeKind::List);
        assert!(list.before(&json!([])).is_none());
        assert!(list.after(&json!([])).is_none());
    }
}
