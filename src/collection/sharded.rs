use super::codec::{self, Decoded};
use super::record::Record;
use crate::core::{Result, StoreError};
use crate::storage::SharedStore;
use serde_json::Value;
use std::marker::PhantomData;

/// Deterministic partitioning of a logical collection into physical keys.
///
/// `shard_of` must be reproducible from the record's own fields. There is
/// no registry of which shards exist, so full reads walk `universe`.
pub trait ShardScheme<R>: Send + Sync {
    /// Shard a record belongs to
    fn shard_of(&self, record: &R) -> Result<String>;

    /// Every shard a full-collection read must visit
    fn universe(&self) -> Vec<String>;
}

/// A logical collection split across `<name>_<shard>` keys.
///
/// Every operation is a synchronous read-modify-write of a single shard;
/// concurrent writers resolve as last-writer-wins per shard.
pub struct ShardedCollection<R, P> {
    store: SharedStore,
    name: String,
    scheme: P,
    marker: PhantomData<fn() -> R>,
}

impl<R: Record, P: ShardScheme<R>> ShardedCollection<R, P> {
    pub fn new(store: SharedStore, name: impl Into<String>, scheme: P) -> Self {
        Self {
            store,
            name: name.into(),
            scheme,
            marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheme(&self) -> &P {
        &self.scheme
    }

    /// Physical key of a shard
    pub fn key_for(&self, shard: &str) -> String {
        format!("{}_{}", self.name, shard)
    }

    pub fn shard_of(&self, record: &R) -> Result<String> {
        self.scheme.shard_of(record)
    }

    /// Records of one shard; absent or malformed shards read as empty.
    pub fn list_shard(&self, shard: &str) -> Result<Vec<R>> {
        codec::list(self.store.as_ref(), &self.key_for(shard))
    }

    /// Records of one shard together with the elements that failed to decode.
    pub fn list_shard_checked(&self, shard: &str) -> Result<Decoded<R>> {
        codec::list_checked(self.store.as_ref(), &self.key_for(shard))
    }

    pub fn get(&self, id: &str, shard: &str) -> Result<Option<R>> {
        codec::find(self.store.as_ref(), &self.key_for(shard), id)
    }

    /// Appends to the shard derived from the record itself.
    pub fn append(&self, record: R) -> Result<R> {
        let shard = self.scheme.shard_of(&record)?;
        self.append_to(record, &shard)
    }

    /// Appends to an explicit shard.
    pub fn append_to(&self, record: R, shard: &str) -> Result<R> {
        let collection = self.name.clone();
        let shard_name = shard.to_string();
        codec::append(self.store.as_ref(), &self.key_for(shard), record, |id| {
            StoreError::DuplicateId {
                collection,
                shard: shard_name,
                id,
            }
        })
    }

    /// Merges `patch` into the record with `id`. `Ok(None)` means the record vanished.
    pub fn replace(&self, id: &str, patch: &Value, shard: &str) -> Result<Option<R>> {
        codec::replace(self.store.as_ref(), &self.key_for(shard), id, patch)
    }

    /// Removes one record; `false` when it was not in the shard.
    pub fn remove(&self, id: &str, shard: &str) -> Result<bool> {
        codec::remove(self.store.as_ref(), &self.key_for(shard), id)
    }

    /// Concatenation of `list_shard` over `shards`, in order.
    pub fn list_all<S: AsRef<str>>(&self, shards: &[S]) -> Result<Vec<R>> {
        let mut all = Vec::new();
        for shard in shards {
            all.extend(self.list_shard(shard.as_ref())?);
        }
        Ok(all)
    }

    /// `list_all` over the scheme's full shard universe.
    pub fn list_universe(&self) -> Result<Vec<R>> {
        self.list_all(&self.scheme.universe())
    }

    /// Write an empty array to every shard of the universe that is still absent.
    pub fn initialize_shards(&self) -> Result<usize> {
        let mut created = 0;
        for shard in self.scheme.universe() {
            let key = self.key_for(&shard);
            if !self.store.contains(&key)? {
                self.store.set(&key, "[]")?;
                created += 1;
            }
        }
        Ok(created)
    }
}
