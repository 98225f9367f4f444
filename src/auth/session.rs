use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalUser {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Demo session flag plus a minimal profile, stored under `auth`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSession {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub user: Option<LocalUser>,
    #[serde(default)]
    pub logged_in_at: Option<String>,
}

/// Session issued by the remote backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl RemoteSession {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            user_id: user_id.into(),
            email: None,
            expires_at: None,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn identity(&self) -> RemoteIdentity {
        RemoteIdentity {
            user_id: self.user_id.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// Owner identity every migrated row is tagged with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIdentity {
    pub user_id: String,
    pub access_token: String,
}

/// Both halves of the auth state as seen by route guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthStatus {
    pub local: bool,
    pub remote: bool,
}

impl AuthStatus {
    pub fn is_authorized(&self) -> bool {
        self.local || self.remote
    }
}
