//! Shared read-modify-write primitives over a single key holding a JSON
//! array of records.
//!
//! Mutations work on the raw JSON so that elements this build cannot
//! decode are carried through untouched instead of being dropped.

use super::record::{Record, new_id, raw_id};
use crate::core::json::merge_fields;
use crate::core::{Result, StoreError};
use crate::storage::KeyValueStore;
use log::warn;
use serde_json::Value;

/// An element (or a whole payload) stored under `key` that does not decode
/// as the collection's record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undecodable {
    pub key: String,
    /// `id` of the raw element; `None` when the whole payload is unreadable
    pub id: Option<String>,
    pub error: String,
}

/// Decoded records of one key, plus whatever could not be decoded.
#[derive(Debug, Clone)]
pub struct Decoded<R> {
    pub records: Vec<R>,
    pub undecodable: Vec<Undecodable>,
}

impl<R> Decoded<R> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.undecodable.is_empty()
    }
}

impl<R> Default for Decoded<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            undecodable: Vec::new(),
        }
    }
}

/// Raw elements under `key`, or why the payload is unreadable.
fn read_payload(store: &dyn KeyValueStore, key: &str) -> Result<std::result::Result<Vec<Value>, String>> {
    let Some(text) = store.get(key)? else {
        return Ok(Ok(Vec::new()));
    };
    let reason = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(items)) => return Ok(Ok(items)),
        Ok(Value::Null) => return Ok(Ok(Vec::new())),
        Ok(other) => format!("expected array, found {}", kind_of(&other)),
        Err(err) => err.to_string(),
    };
    warn!("malformed payload under '{}': {}", key, reason);
    Ok(Err(reason))
}

pub(crate) fn load_raw(store: &dyn KeyValueStore, key: &str) -> Result<Vec<Value>> {
    Ok(read_payload(store, key)?.unwrap_or_default())
}

pub(crate) fn store_raw(store: &dyn KeyValueStore, key: &str, items: &[Value]) -> Result<()> {
    let text = serde_json::to_string(items)?;
    store.set(key, &text)
}

pub(crate) fn decode_checked<R: Record>(key: &str, items: Vec<Value>) -> Decoded<R> {
    let mut decoded = Decoded::default();
    for item in items {
        let id = raw_id(&item);
        match serde_json::from_value::<R>(item) {
            Ok(record) => decoded.records.push(record),
            Err(err) => {
                warn!("skipping undecodable record in '{}': {}", key, err);
                decoded.undecodable.push(Undecodable {
                    key: key.to_string(),
                    id,
                    error: err.to_string(),
                });
            }
        }
    }
    decoded
}

pub(crate) fn decode_all<R: Record>(key: &str, items: Vec<Value>) -> Vec<R> {
    decode_checked(key, items).records
}

pub(crate) fn list<R: Record>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<R>> {
    Ok(decode_all(key, load_raw(store, key)?))
}

/// Like [`list`], but reports what could not be read instead of dropping it.
pub(crate) fn list_checked<R: Record>(store: &dyn KeyValueStore, key: &str) -> Result<Decoded<R>> {
    Ok(match read_payload(store, key)? {
        Ok(items) => decode_checked(key, items),
        Err(reason) => Decoded {
            records: Vec::new(),
            undecodable: vec![Undecodable {
                key: key.to_string(),
                id: None,
                error: reason,
            }],
        },
    })
}

pub(crate) fn find<R: Record>(store: &dyn KeyValueStore, key: &str, id: &str) -> Result<Option<R>> {
    let items = load_raw(store, key)?;
    let found = items
        .into_iter()
        .filter(|item| raw_id(item).as_deref() == Some(id))
        .take(1)
        .collect();
    Ok(decode_all(key, found).into_iter().next())
}

/// Appends `record`; an empty id is replaced with a fresh one.
pub(crate) fn append<R: Record>(
    store: &dyn KeyValueStore,
    key: &str,
    mut record: R,
    duplicate: impl FnOnce(String) -> StoreError,
) -> Result<R> {
    if record.id().trim().is_empty() {
        record.set_id(new_id());
    }

    let mut items = load_raw(store, key)?;
    if items.iter().any(|item| raw_id(item).as_deref() == Some(record.id())) {
        return Err(duplicate(record.id().to_string()));
    }

    items.push(serde_json::to_value(&record)?);
    store_raw(store, key, &items)?;
    Ok(record)
}

/// Merges `patch` into the record with `id`. `Ok(None)` when the record is gone.
pub(crate) fn replace<R: Record>(
    store: &dyn KeyValueStore,
    key: &str,
    id: &str,
    patch: &Value,
) -> Result<Option<R>> {
    if !patch.is_object() {
        return Err(StoreError::InvalidRecord("patch must be a JSON object".into()));
    }

    let mut items = load_raw(store, key)?;
    let Some(position) = items.iter().position(|item| raw_id(item).as_deref() == Some(id)) else {
        return Ok(None);
    };

    let mut merged = items[position].clone();
    let original_id = merged.get("id").cloned().unwrap_or(Value::Null);
    if !merge_fields(&mut merged, patch) {
        return Err(StoreError::InvalidRecord(format!("record '{}' in '{}' is not an object", id, key)));
    }
    if let Value::Object(fields) = &mut merged {
        fields.insert("id".to_string(), original_id);
    }

    let updated: R = serde_json::from_value(merged.clone())
        .map_err(|e| StoreError::InvalidRecord(format!("patch for '{}' produces invalid record: {}", id, e)))?;

    items[position] = merged;
    store_raw(store, key, &items)?;
    Ok(Some(updated))
}

/// Removes the first record with `id`; `false` when nothing matched.
pub(crate) fn remove(store: &dyn KeyValueStore, key: &str, id: &str) -> Result<bool> {
    let mut items = load_raw(store, key)?;
    let Some(position) = items.iter().position(|item| raw_id(item).as_deref() == Some(id)) else {
        return Ok(false);
    };
    items.remove(position);
    store_raw(store, key, &items)?;
    Ok(true)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
