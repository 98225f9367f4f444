//! Themes went from plain strings (`["Elegant", "Rustic"]`) to objects.
//! Both shapes are read through [`StoredTheme`] and normalized once.

use crate::collection::record::{id_string, opt_id_string};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "opt_id_string", skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Theme {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Orders written before themes had ids reference them by name.
    pub fn matches(&self, reference: &str) -> bool {
        self.id == reference || self.name.eq_ignore_ascii_case(reference.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredTheme {
    Legacy(String),
    Current(Theme),
}

impl StoredTheme {
    /// Legacy themes keep their name as id so old order references resolve.
    pub fn normalize(self) -> Theme {
        match self {
            StoredTheme::Legacy(name) => {
                let name = name.trim().to_string();
                Theme {
                    id: name.clone(),
                    name,
                    ..Theme::default()
                }
            }
            StoredTheme::Current(theme) => theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_mixed_payload() {
        let stored: Vec<StoredTheme> =
            serde_json::from_value(json!(["Elegant", {"id": "t2", "name": "Rustic"}])).unwrap();
        let themes: Vec<Theme> = stored.into_iter().map(StoredTheme::normalize).collect();

        assert_eq!(themes[0].id, "Elegant");
        assert_eq!(themes[0].name, "Elegant");
        assert_eq!(themes[1].id, "t2");
        assert!(themes[1].matches("rustic"));
        assert!(themes[1].matches("t2"));
    }
}
