//! Dual-session auth bridge

use std::sync::Arc;
use undangan::core::StoreError;
use undangan::keys;
use undangan::{AuthBridge, DemoAccount, KeyValueStore, MemoryStore, RemoteSession};

struct Fixture {
    durable: Arc<MemoryStore>,
    ephemeral: Arc<MemoryStore>,
    bridge: AuthBridge,
}

fn fixture() -> Fixture {
    let durable = Arc::new(MemoryStore::new());
    let ephemeral = Arc::new(MemoryStore::new());
    let bridge = AuthBridge::new(durable.clone(), ephemeral.clone(), DemoAccount::default());
    Fixture {
        durable,
        ephemeral,
        bridge,
    }
}

#[test]
fn test_unauthenticated_by_default() {
    let f = fixture();
    let status = f.bridge.status().unwrap();
    assert!(!status.local);
    assert!(!status.remote);
    assert!(!f.bridge.is_authorized().unwrap());
    assert!(f.bridge.remote_identity().unwrap().is_none());
}

#[test]
fn test_demo_login() {
    let f = fixture();

    let err = f.bridge.login_demo("admin", "salah").unwrap_err();
    assert_eq!(err, StoreError::InvalidCredentials);
    assert!(!f.bridge.is_authorized().unwrap());

    let session = f.bridge.login_demo("admin", "admin123").unwrap();
    assert!(session.is_authenticated);
    assert!(f.durable.contains(keys::AUTH).unwrap());
    assert!(f.bridge.is_authorized().unwrap());
    // the demo session grants no remote identity
    assert!(f.bridge.remote_identity().unwrap().is_none());

    f.bridge.logout_demo().unwrap();
    assert!(!f.bridge.is_authorized().unwrap());
}

#[test]
fn test_remote_session_placement_follows_remember_me() {
    let f = fixture();
    let session = RemoteSession::new("user-1", "token-1");

    f.bridge.start_remote_session(&session, false).unwrap();
    assert!(f.ephemeral.contains(keys::REMOTE_SESSION).unwrap());
    assert!(!f.durable.contains(keys::REMOTE_SESSION).unwrap());
    assert!(f.bridge.is_authorized().unwrap());

    f.bridge.start_remote_session(&session, true).unwrap();
    assert!(f.durable.contains(keys::REMOTE_SESSION).unwrap());
    assert!(!f.ephemeral.contains(keys::REMOTE_SESSION).unwrap());
    assert_eq!(f.bridge.remote_identity().unwrap().unwrap().user_id, "user-1");
}

#[test]
fn test_switching_remember_me_moves_the_token() {
    let f = fixture();
    let session = RemoteSession::new("user-1", "token-1");
    f.bridge.start_remote_session(&session, false).unwrap();

    f.bridge.set_remember_me(true).unwrap();
    assert!(f.bridge.remember_me().unwrap());
    assert!(f.durable.contains(keys::REMOTE_SESSION).unwrap());
    assert!(!f.ephemeral.contains(keys::REMOTE_SESSION).unwrap());
    assert_eq!(f.bridge.remote_session().unwrap(), Some(session.clone()));

    f.bridge.set_remember_me(false).unwrap();
    assert!(!f.durable.contains(keys::REMOTE_SESSION).unwrap());
    assert!(f.ephemeral.contains(keys::REMOTE_SESSION).unwrap());
    assert_eq!(f.bridge.remote_session().unwrap(), Some(session));
    assert!(f.bridge.is_authorized().unwrap());
}

#[test]
fn test_expired_remote_session_does_not_authorize() {
    let f = fixture();
    let mut session = RemoteSession::new("user-1", "token-1");
    session.expires_at = Some(1);
    f.bridge.start_remote_session(&session, true).unwrap();

    assert!(f.bridge.remote_session().unwrap().is_some());
    assert!(!f.bridge.status().unwrap().remote);
    assert!(!f.bridge.is_authorized().unwrap());
    assert!(f.bridge.remote_identity().unwrap().is_none());
}

#[test]
fn test_malformed_session_reads_as_absent() {
    let f = fixture();
    f.durable.set(keys::AUTH, "{oops").unwrap();
    f.ephemeral.set(keys::REMOTE_SESSION, "[]").unwrap();

    assert!(f.bridge.local_session().unwrap().is_none());
    assert!(f.bridge.remote_session().unwrap().is_none());
    assert!(!f.bridge.is_authorized().unwrap());
}

#[test]
fn test_logout_clears_both_sessions() {
    let f = fixture();
    f.bridge.login_demo("admin", "admin123").unwrap();
    f.bridge
        .start_remote_session(&RemoteSession::new("user-1", "token-1"), true)
        .unwrap();

    f.bridge.logout().unwrap();

    assert!(!f.bridge.is_authorized().unwrap());
    assert!(!f.durable.contains(keys::AUTH).unwrap());
    assert!(!f.durable.contains(keys::REMOTE_SESSION).unwrap());
}

#[test]
fn test_custom_demo_account() {
    let durable = Arc::new(MemoryStore::new());
    let account = DemoAccount::with_password("owner", "rahasia", 4).unwrap();
    let bridge = AuthBridge::new(durable, Arc::new(MemoryStore::new()), account);

    assert!(bridge.login_demo("admin", "admin123").is_err());
    assert!(bridge.login_demo("owner", "rahasia").is_ok());
}
