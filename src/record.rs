//! # Record Trait
//!
//! Every item held in a resource collection implements [`Record`]. The only
//! thing the reducer needs from an item is its merge key: two items with the
//! same [`Record::id`] are the same logical item.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// Trait that any collection item must implement to be merged by the reducer.
///
/// Items travel over the wire as JSON, so they must round-trip through `serde`.
/// The identifier type must deserialize on its own as well, since `delete` and
/// `deleteBatch` notifications carry bare identifiers.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The merge key (e.g. `u64`, `String`, `Uuid`).
    type Id: Eq + Hash + Clone + Debug + Display + Serialize + DeserializeOwned + Send + Sync;

    /// Returns the stable identifier of this item.
    fn id(&self) -> Self::Id;
}

/// Identifier of an untyped JSON record, read from its `"id"` field.
///
/// Integer and string identifiers are kept apart, so `7` and `"7"` are
/// different keys. A record without an `id` field has [`RecordKey::Missing`].
///
/// Bare identifiers (`delete`, `deleteBatch` payloads) decode with the same
/// mapping as [`Record::id`], so any JSON value is accepted. A key matching no
/// item removes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Text(String),
    Missing,
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Int(n) => write!(f, "{n}"),
            RecordKey::Text(s) => f.write_str(s),
            RecordKey::Missing => f.write_str("<missing>"),
        }
    }
}

impl RecordKey {
    /// Maps a bare JSON identifier to its key.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(n) => RecordKey::Int(n),
                None => RecordKey::Text(n.to_string()),
            },
            Value::String(s) => RecordKey::Text(s.clone()),
            Value::Null => RecordKey::Missing,
            other => RecordKey::Text(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for RecordKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| RecordKey::from_value(&value))
    }
}

impl Record for Value {
    type Id = RecordKey;

    fn id(&self) -> RecordKey {
        self.get("id").map_or(RecordKey::Missing, RecordKey::from_value)
    }
}
