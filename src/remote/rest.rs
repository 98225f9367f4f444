//! PostgREST-style HTTP backend (`/rest/v1/<table>`, `/auth/v1/token`).

use super::schema::{RemoteRow, RemoteTable};
use super::{RemoteError, RemoteResult, RemoteStore};
use crate::auth::{RemoteIdentity, RemoteSession};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub struct RestRemote {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl RestRemote {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Password grant sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<RemoteSession> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(RemoteSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user_id: token.user.id,
            email: token.user.email,
            expires_at: token.expires_in.map(|secs| Utc::now().timestamp() + secs),
        })
    }
}

#[async_trait]
impl RemoteStore for RestRemote {
    async fn insert(
        &self,
        identity: &RemoteIdentity,
        table: RemoteTable,
        row: RemoteRow,
    ) -> RemoteResult<String> {
        let url = format!("{}/rest/v1/{}", self.base_url, table.name());
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&identity.access_token)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        let inserted = match &body {
            Value::Array(rows) => rows.first(),
            other => Some(other),
        };
        inserted
            .and_then(|r| r.get("id"))
            .and_then(|id| match id {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| RemoteError::Decode(format!("insert into {} returned no id", table)))
    }
}
