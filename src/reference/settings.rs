use crate::collection::Undecodable;
use crate::core::json::{merge_defaults, merge_fields};
use crate::core::{Result, StoreError};
use crate::storage::SharedStore;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

/// Singleton settings object under one key, read as stored-over-defaults.
pub struct SettingsStore<T> {
    store: SharedStore,
    key: String,
    marker: PhantomData<fn() -> T>,
}

impl<T> SettingsStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
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

    /// Stored fields win; missing ones come from `T::default()`.
    /// An unreadable payload yields the defaults.
    pub fn load(&self) -> Result<T> {
        Ok(self.load_checked()?.0)
    }

    /// Like [`Self::load`], but also reports a stored payload that could not
    /// be read and was replaced by the defaults.
    pub fn load_checked(&self) -> Result<(T, Option<Undecodable>)> {
        let defaults = serde_json::to_value(T::default())?;
        let stored = match self.store.get(&self.key)? {
            Some(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(err) => {
                    warn!("malformed settings under '{}': {}", self.key, err);
                    return Ok((T::default(), Some(self.undecodable(err))));
                }
            },
            None => Value::Null,
        };

        match serde_json::from_value(merge_defaults(&defaults, &stored)) {
            Ok(settings) => Ok((settings, None)),
            Err(err) => {
                warn!("settings under '{}' do not match the schema: {}", self.key, err);
                Ok((T::default(), Some(self.undecodable(err))))
            }
        }
    }

    fn undecodable(&self, err: serde_json::Error) -> Undecodable {
        Undecodable {
            key: self.key.clone(),
            id: None,
            error: err.to_string(),
        }
    }

    pub fn save(&self, settings: &T) -> Result<()> {
        let text = serde_json::to_string(settings)?;
        self.store.set(&self.key, &text)
    }

    /// Merge a partial object into the current settings and persist.
    pub fn update(&self, patch: &Value) -> Result<T> {
        let mut current = serde_json::to_value(self.load()?)?;
        if !merge_fields(&mut current, patch) {
            return Err(StoreError::InvalidRecord("settings patch must be a JSON object".into()));
        }
        let updated: T = serde_json::from_value(current)
            .map_err(|e| StoreError::InvalidRecord(format!("invalid settings for '{}': {}", self.key, e)))?;
        self.save(&updated)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeneralSettings;
    use crate::storage::{KeyValueStore, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_load_merges_defaults_and_keeps_unknown_keys() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("generalSettings", r#"{"businessName":"Kartu Kita","legacyFlag":true}"#)
            .unwrap();

        let settings = SettingsStore::<GeneralSettings>::new(store.clone(), "generalSettings");
        let loaded = settings.load().unwrap();
        assert_eq!(loaded.business_name, "Kartu Kita");
        assert_eq!(loaded.currency, "IDR");
        assert_eq!(loaded.extra.get("legacyFlag"), Some(&json!(true)));

        let updated = settings.update(&json!({"darkMode": true})).unwrap();
        assert!(updated.dark_mode);
        let raw: Value = serde_json::from_str(&store.get("generalSettings").unwrap().unwrap()).unwrap();
        assert_eq!(raw["legacyFlag"], json!(true));
        assert_eq!(raw["darkMode"], json!(true));
    }

    #[test]
    fn test_malformed_settings_fall_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set("generalSettings", "{not json").unwrap();
        let settings = SettingsStore::<GeneralSettings>::new(store, "generalSettings");
        assert_eq!(settings.load().unwrap(), GeneralSettings::default());

        let (loaded, unreadable) = settings.load_checked().unwrap();
        assert_eq!(loaded, GeneralSettings::default());
        let unreadable = unreadable.unwrap();
        assert_eq!(unreadable.key, "generalSettings");
        assert_eq!(unreadable.id, None);
    }

    #[test]
    fn test_absent_or_valid_settings_report_nothing_unreadable() {
        let store = Arc::new(MemoryStore::new());
        let settings = SettingsStore::<GeneralSettings>::new(store.clone(), "generalSettings");
        assert!(settings.load_checked().unwrap().1.is_none());

        store.set("generalSettings", r#"{"businessName":"Kartu Kita"}"#).unwrap();
        let (loaded, unreadable) = settings.load_checked().unwrap();
        assert_eq!(loaded.business_name, "Kartu Kita");
        assert!(unreadable.is_none());
    }
}
