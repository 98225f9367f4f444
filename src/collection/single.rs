use super::codec::{self, Decoded};
use super::record::Record;
use crate::core::{Result, StoreError};
use crate::storage::SharedStore;
use serde_json::Value;
use std::marker::PhantomData;

/// An unsharded collection stored as one JSON array under one key.
pub struct SingleCollection<R> {
    store: SharedStore,
    key: String,
    marker: PhantomData<fn() -> R>,
}

impl<R: Record> SingleCollection<R> {
    pub fn new(store: SharedStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether anything has ever been written under the key
    pub fn exists(&self) -> Result<bool> {
        self.store.contains(&self.key)
    }

    pub fn list(&self) -> Result<Vec<R>> {
        codec::list(self.store.as_ref(), &self.key)
    }

    pub fn list_checked(&self) -> Result<Decoded<R>> {
        codec::list_checked(self.store.as_ref(), &self.key)
    }

    pub fn get(&self, id: &str) -> Result<Option<R>> {
        codec::find(self.store.as_ref(), &self.key, id)
    }

    /// Overwrites the whole collection.
    pub fn save(&self, records: &[R]) -> Result<()> {
        let items = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        codec::store_raw(self.store.as_ref(), &self.key, &items)
    }

    pub fn append(&self, record: R) -> Result<R> {
        let key = self.key.clone();
        codec::append(self.store.as_ref(), &self.key, record, |id| StoreError::DuplicateId {
            collection: key,
            shard: String::new(),
            id,
        })
    }

    pub fn replace(&self, id: &str, patch: &Value) -> Result<Option<R>> {
        codec::replace(self.store.as_ref(), &self.key, id, patch)
    }

    pub fn remove(&self, id: &str) -> Result<bool> {
        codec::remove(self.store.as_ref(), &self.key, id)
    }
}
