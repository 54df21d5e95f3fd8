//! # Collection Reducer
//!
//! [`reduce`] folds one [`Action`] into a [`StoreState`] and returns the next
//! state. It is pure: the input is left untouched and every untouched resource
//! slice is shared with the result (`im` persistent collections).
//!
//! Invariant: items of a collection are keyed by [`Record::id`]; two items with
//! the same identifier are the same logical item.

use crate::notification::{Action, Change};
use crate::record::Record;
use im::{HashMap, Vector};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Mapping from resource name to its ordered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StoreState<T: Record> {
    collections: HashMap<String, Vector<T>>,
}

impl<T: Record> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
        }
    }
}

impl<T: Record> StoreState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection of `resource`, if any notification populated it.
    pub fn collection(&self, resource: &str) -> Option<&Vector<T>> {
        self.collections.get(resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Returns a state where `resource` holds `collection`; siblings are shared.
    pub fn with_collection(&self, resource: &str, collection: Vector<T>) -> Self {
        Self {
            collections: self.collections.update(resource.to_string(), collection),
        }
    }
}

/// Folds `action` into `state`.
///
/// `Read` notifications and custom actions leave the state unchanged. Every other
/// notification replaces the slice of its resource; a missing slice behaves as
/// an empty collection, and deletions leave it missing.
pub fn reduce<T: Record>(state: &StoreState<T>, action: &Action<T>) -> StoreState<T> {
    let notification = match action {
        Action::Crud(notification) => notification,
        Action::Custom { .. } => return state.clone(),
    };

    let existing = state.collection(&notification.resource);
    match notification.change {
        Change::Read(_) => return state.clone(),
        // Removing from a missing slice must not create it
        Change::Delete(_) | Change::DeleteBatch(_) if existing.is_none() => return state.clone(),
        _ => {}
    }

    let current = existing.cloned().unwrap_or_default();
    let next = apply_change(current, &notification.change);
    state.with_collection(&notification.resource, next)
}

fn apply_change<T: Record>(mut collection: Vector<T>, change: &Change<T>) -> Vector<T> {
    match change {
        Change::List(items) => items.iter().cloned().collect(),
        Change::Read(_) => collection,
        Change::Create(item) => {
            collection.push_back(item.clone());
            collection
        }
        Change::Update(item) => {
            let id = item.id();
            // Unknown identifiers are ignored
            if let Some(index) = collection.iter().position(|existing| existing.id() == id) {
                collection.set(index, item.clone());
            }
            collection
        }
        Change::Delete(id) => collection
            .into_iter()
            .filter(|item| item.id() != *id)
            .collect(),
        Change::CreateBatch(items) => {
            collection.extend(items.iter().cloned());
            collection
        }
        Change::UpdateBatch(items) => update_batch(collection, items),
        Change::DeleteBatch(ids) => {
            let ids: HashSet<&T::Id> = ids.iter().collect();
            collection
                .into_iter()
                .filter(|item| !ids.contains(&item.id()))
                .collect()
        }
    }
}

/// Existing keys keep their position, new keys follow in batch order.
fn update_batch<T: Record>(collection: Vector<T>, items: &[T]) -> Vector<T> {
    let mut by_id: IndexMap<T::Id, T> = collection
        .into_iter()
        .map(|item| (item.id(), item))
        .collect();

    for item in items {
        by_id.insert(item.id(), item.clone());
    }

    by_id.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{make_notifications, Notifications};
    use crate::record::RecordKey;
    use serde_json::{json, Value};

    fn docs() -> Notifications<Value> {
        make_notifications("docs")
    }

    fn fold(state: &StoreState<Value>, action: impl Into<Action<Value>>) -> StoreState<Value> {
        reduce(state, &action.into())
    }

    fn seeded() -> StoreState<Value> {
        fold(
            &StoreState::new(),
            docs().list(vec![
                json!({ "id": 1, "title": "a" }),
                json!({ "id": 2, "title": "b" }),
                json!({ "id": 3, "title": "c" }),
            ]),
        )
    }

    fn items(state: &StoreState<Value>, resource: &str) -> Vec<Value> {
        state
            .collection(resource)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn ids(state: &StoreState<Value>) -> Vec<RecordKey> {
        items(state, "docs").iter().map(|item| item.id()).collect()
    }

    #[test]
    fn test_list_replaces_collection() {
        let replacement = vec![json!({ "id": 9 })];
        let state = fold(&seeded(), docs().list(replacement.clone()));
        assert_eq!(items(&state, "docs"), replacement);
    }

    #[test]
    fn test_create_appends() {
        let before = seeded();
        let state = fold(&before, docs().create(json!({ "id": 4 })));

        assert_eq!(ids(&state), [1, 2, 3, 4].map(RecordKey::Int));
        // The input state is untouched
        assert_eq!(ids(&before), [1, 2, 3].map(RecordKey::Int));
    }

    #[test]
    fn test_update_replaces_in_place() {
        let state = fold(&seeded(), docs().update(json!({ "id": 2, "title": "B" })));

        assert_eq!(ids(&state), [1, 2, 3].map(RecordKey::Int));
        assert_eq!(items(&state, "docs")[1]["title"], "B");
        assert_eq!(items(&state, "docs")[0]["title"], "a");
    }

    #[test]
    fn test_update_of_unknown_id_is_ignored() {
        let before = seeded();
        let state = fold(&before, docs().update(json!({ "id": 42, "title": "x" })));
        assert_eq!(state, before);
    }

    #[test]
    fn test_delete_removes_matching_and_is_idempotent() {
        let once = fold(&seeded(), docs().delete(RecordKey::Int(2)));
        assert_eq!(ids(&once), [1, 3].map(RecordKey::Int));

        let twice = fold(&once, docs().delete(RecordKey::Int(2)));
        assert_eq!(twice, once);
    }

    #[test]
    fn test_delete_of_unknown_id_keeps_collection() {
        let before = seeded();
        let state = fold(&before, docs().delete(RecordKey::Int(99)));
        assert_eq!(items(&state, "docs"), items(&before, "docs"));
    }

    #[test]
    fn test_create_batch_appends_in_order() {
        let state = fold(
            &seeded(),
            docs().create_batch(vec![json!({ "id": 5 }), json!({ "id": 4 })]),
        );
        assert_eq!(ids(&state), [1, 2, 3, 5, 4].map(RecordKey::Int));
    }

    #[test]
    fn test_update_batch_merges_by_id() {
        let state = fold(
            &seeded(),
            docs().update_batch(vec![
                json!({ "id": 5, "title": "e" }),
                json!({ "id": 1, "title": "A" }),
                json!({ "id": 4, "title": "d" }),
            ]),
        );

        assert_eq!(ids(&state), [1, 2, 3, 5, 4].map(RecordKey::Int));
        assert_eq!(items(&state, "docs")[0]["title"], "A");

        let unique: HashSet<RecordKey> = ids(&state).into_iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_delete_batch_removes_members() {
        let state = fold(
            &seeded(),
            docs().delete_batch(vec![RecordKey::Int(1), RecordKey::Int(3), RecordKey::Int(7)]),
        );
        assert_eq!(ids(&state), [RecordKey::Int(2)]);
    }

    #[test]
    fn test_missing_collection_behaves_as_empty() {
        let empty = StoreState::new();

        let created = fold(&empty, docs().create(json!({ "id": 1 })));
        assert_eq!(ids(&created), [RecordKey::Int(1)]);

        let updated = fold(&empty, docs().update_batch(vec![json!({ "id": 1 })]));
        assert_eq!(ids(&updated), [RecordKey::Int(1)]);

        let deleted = fold(&empty, docs().delete_batch(vec![RecordKey::Int(1)]));
        assert_eq!(deleted, empty);
        assert!(deleted.collection("docs").is_none());

        let deleted = fold(&empty, docs().delete(RecordKey::Int(9)));
        assert!(deleted.collection("docs").is_none());
    }

    #[test]
    fn test_read_and_custom_actions_are_no_ops() {
        let before = seeded();
        assert_eq!(fold(&before, docs().read(json!({ "id": 1, "title": "z" }))), before);
        assert_eq!(fold(&before, Action::custom("HOOK_AFTER", json!(null))), before);

        // A read never creates a slice
        let untouched = fold(&StoreState::new(), docs().read(json!({ "id": 1 })));
        assert!(untouched.is_empty());
    }

    #[test]
    fn test_sibling_collections_are_untouched() {
        let users: Notifications<Value> = make_notifications("users");
        let state = fold(&seeded(), users.list(vec![json!({ "id": "u1" })]));
        let state = fold(&state, users.delete(RecordKey::Text("u1".into())));

        assert_eq!(ids(&state), [1, 2, 3].map(RecordKey::Int));
        assert!(items(&state, "users").is_empty());
    }
}
