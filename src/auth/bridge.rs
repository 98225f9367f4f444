use super::demo::DemoAccount;
use super::session::{AuthStatus, LocalSession, LocalUser, RemoteIdentity, RemoteSession};
use crate::core::{Result, StoreError};
use crate::keys;
use crate::storage::SharedStore;
use chrono::Local;
use log::{debug, warn};
use serde::de::DeserializeOwned;

/// Reconciles the local demo session and the remote session into one
/// "is authorized" predicate.
///
/// The remote session lives in the durable store when "remember me" is on
/// and in the ephemeral store otherwise; the flag itself is durable.
pub struct AuthBridge {
    durable: SharedStore,
    ephemeral: SharedStore,
    demo: DemoAccount,
}

impl AuthBridge {
    pub fn new(durable: SharedStore, ephemeral: SharedStore, demo: DemoAccount) -> Self {
        Self {
            durable,
            ephemeral,
            demo,
        }
    }

    /// Starts the local demo session after checking the credentials.
    pub fn login_demo(&self, username: &str, password: &str) -> Result<LocalSession> {
        if !self.demo.verify(username, password) {
            return Err(StoreError::InvalidCredentials);
        }
        let session = LocalSession {
            is_authenticated: true,
            user: Some(LocalUser {
                username: username.to_string(),
                name: username.to_string(),
                role: "admin".to_string(),
            }),
            logged_in_at: Some(Local::now().to_rfc3339()),
        };
        self.durable.set(keys::AUTH, &serde_json::to_string(&session)?)?;
        Ok(session)
    }

    pub fn local_session(&self) -> Result<Option<LocalSession>> {
        read_json(&self.durable, keys::AUTH)
    }

    pub fn remember_me(&self) -> Result<bool> {
        Ok(read_json::<bool>(&self.durable, keys::REMEMBER_ME)?.unwrap_or(false))
    }

    /// Stores a remote session where the `remember` choice says, clearing
    /// any copy in the other store.
    pub fn start_remote_session(&self, session: &RemoteSession, remember: bool) -> Result<()> {
        let text = serde_json::to_string(session)?;
        let (target, other) = self.stores_for(remember);
        target.set(keys::REMOTE_SESSION, &text)?;
        other.remove(keys::REMOTE_SESSION)?;
        self.durable.set(keys::REMEMBER_ME, if remember { "true" } else { "false" })?;
        Ok(())
    }

    /// The current remote session, wherever it is stored. Expired sessions
    /// are returned too; callers check [`RemoteSession::is_expired`].
    pub fn remote_session(&self) -> Result<Option<RemoteSession>> {
        let (primary, secondary) = self.stores_for(self.remember_me()?);
        if let Some(session) = read_json(primary, keys::REMOTE_SESSION)? {
            return Ok(Some(session));
        }
        read_json(secondary, keys::REMOTE_SESSION)
    }

    /// Switches "remember me" mid-session, moving the token instead of
    /// dropping it. The new copy is written before the old one is removed.
    pub fn set_remember_me(&self, remember: bool) -> Result<()> {
        let current = self.remember_me()?;
        if current == remember {
            return Ok(());
        }

        let (from, to) = (self.stores_for(current).0, self.stores_for(remember).0);
        if let Some(token) = from.get(keys::REMOTE_SESSION)? {
            to.set(keys::REMOTE_SESSION, &token)?;
            from.remove(keys::REMOTE_SESSION)?;
            debug!("moved remote session (remember_me={})", remember);
        }
        self.durable.set(keys::REMEMBER_ME, if remember { "true" } else { "false" })?;
        Ok(())
    }

    pub fn status(&self) -> Result<AuthStatus> {
        let local = self
            .local_session()?
            .is_some_and(|session| session.is_authenticated);
        let remote = self
            .remote_session()?
            .is_some_and(|session| !session.is_expired());
        Ok(AuthStatus { local, remote })
    }

    /// `local flag OR live remote session`
    pub fn is_authorized(&self) -> Result<bool> {
        Ok(self.status()?.is_authorized())
    }

    /// Identity for remote writes; `None` without a live remote session.
    pub fn remote_identity(&self) -> Result<Option<RemoteIdentity>> {
        Ok(self
            .remote_session()?
            .filter(|session| !session.is_expired())
            .map(|session| session.identity()))
    }

    pub fn logout_demo(&self) -> Result<()> {
        self.durable.remove(keys::AUTH)
    }

    pub fn logout_remote(&self) -> Result<()> {
        self.durable.remove(keys::REMOTE_SESSION)?;
        self.ephemeral.remove(keys::REMOTE_SESSION)
    }

    pub fn logout(&self) -> Result<()> {
        self.logout_demo()?;
        self.logout_remote()
    }

    fn stores_for(&self, remember: bool) -> (&SharedStore, &SharedStore) {
        if remember {
            (&self.durable, &self.ephemeral)
        } else {
            (&self.ephemeral, &self.durable)
        }
    }
}

/// Missing or malformed payloads read as `None`.
fn read_json<T: DeserializeOwned>(store: &SharedStore, key: &str) -> Result<Option<T>> {
    let Some(text) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&text) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!("ignoring malformed '{}': {}", key, err);
            Ok(None)
        }
    }
}
