use super::{KeyValueStore, NoticeBoard, NoticeLevel};
use crate::core::Result;
use log::warn;
use std::sync::Arc;

/// Adapter boundary for transient storage faults.
///
/// Wraps a store so that failed writes are logged and surfaced as a
/// dismissible notice before the error is handed back to the caller.
/// Nothing here panics or retries.
pub struct GuardedStore<S> {
    inner: S,
    notices: Arc<NoticeBoard>,
}

impl<S: KeyValueStore> GuardedStore<S> {
    pub fn new(inner: S, notices: Arc<NoticeBoard>) -> Self {
        Self { inner, notices }
    }

    pub fn notices(&self) -> &Arc<NoticeBoard> {
        &self.notices
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn surface<T>(&self, op: &str, key: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!("local storage {} failed: key='{}' error='{}'", op, key, err);
            let message = if err.is_transient() {
                format!("Could not save '{}': {}", key, err)
            } else {
                format!("Storage error on '{}': {}", key, err)
            };
            self.notices.push(NoticeLevel::Error, message);
        }
        result
    }
}

impl<S: KeyValueStore> KeyValueStore for GuardedStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.inner.get(key);
        self.surface("read", key, result)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let result = self.inner.set(key, value);
        self.surface("write", key, result)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let result = self.inner.remove(key);
        self.surface("remove", key, result)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let result = self.inner.keys();
        self.surface("list", "*", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_failed_write_becomes_notice() {
        let notices = Arc::new(NoticeBoard::new());
        let store = GuardedStore::new(MemoryStore::with_quota(8), notices.clone());

        store.set("a", "1").unwrap();
        assert!(store.set("big", "0123456789").is_err());

        let pending = notices.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].level, NoticeLevel::Error);
        assert!(pending[0].message.contains("big"));

        assert!(notices.dismiss(pending[0].id));
        assert!(!notices.dismiss(pending[0].id));
        assert!(notices.pending().is_empty());
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }
}
