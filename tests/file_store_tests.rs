//! File-backed store and workspace durability

use std::sync::Arc;
use tempfile::TempDir;
use undangan::core::StoreError;
use undangan::storage::NoticeLevel;
use undangan::{
    AppConfig, FileStore, GuardedStore, KeyValueStore, Month, NoticeBoard, Order, RemoteSession,
    Workspace,
};

fn config(dir: &TempDir) -> AppConfig {
    AppConfig::new().data_dir(dir.path()).active_year(2024)
}

#[test]
fn test_set_get_remove() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    assert_eq!(store.get("orders_januari").unwrap(), None);
    store.set("orders_januari", "[]").unwrap();
    store.set("transactions_2024_mei", r#"[{"id":"t1"}]"#).unwrap();
    store.set("orders_januari", r#"[{"id":"o1"}]"#).unwrap();

    assert_eq!(store.get("orders_januari").unwrap().as_deref(), Some(r#"[{"id":"o1"}]"#));
    assert_eq!(store.keys().unwrap(), vec!["orders_januari", "transactions_2024_mei"]);

    store.remove("orders_januari").unwrap();
    store.remove("orders_januari").unwrap();
    assert!(!store.contains("orders_januari").unwrap());
    assert_eq!(store.keys().unwrap(), vec!["transactions_2024_mei"]);
}

#[test]
fn test_values_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        store.set("generalSettings", r#"{"businessName":"Kartu Kita"}"#).unwrap();
        store.set("odd key/with.dots", "1").unwrap();
    }

    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(
        store.get("generalSettings").unwrap().as_deref(),
        Some(r#"{"businessName":"Kartu Kita"}"#)
    );
    assert_eq!(store.get("odd key/with.dots").unwrap().as_deref(), Some("1"));
    assert_eq!(store.keys().unwrap().len(), 2);
}

#[test]
fn test_quota_rejects_write_and_keeps_other_keys() {
    let dir = TempDir::new().unwrap();
    let notices = Arc::new(NoticeBoard::new());
    let store = GuardedStore::new(FileStore::open(dir.path()).unwrap().with_quota(32), notices.clone());

    store.set("a", "0123456789").unwrap();
    let err = store.set("b", "0123456789012345678901234567890").unwrap_err();

    assert!(matches!(err, StoreError::QuotaExceeded { ref key, .. } if key == "b"));
    assert!(err.is_transient());
    assert_eq!(store.get("a").unwrap().as_deref(), Some("0123456789"));
    assert_eq!(store.get("b").unwrap(), None);

    let pending = notices.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].level, NoticeLevel::Error);

    // overwriting an existing key only counts the new value
    store.set("a", "01234567890123456789").unwrap();
}

#[test]
fn test_workspace_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let order_id = {
        let workspace = Workspace::open(config(&dir)).unwrap();
        workspace.initialize().unwrap();
        let order = workspace
            .orders()
            .add(Order::new("Rina & Dimas", "2024-02-14", "350.000"))
            .unwrap();
        workspace
            .auth()
            .start_remote_session(&RemoteSession::new("user-1", "token"), true)
            .unwrap();
        order.id
    };

    let workspace = Workspace::open(config(&dir)).unwrap();
    let report = workspace.initialize().unwrap();
    assert!(report.is_noop());

    let february = workspace.orders().list_month(Month::Februari).unwrap();
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].id, order_id);
    assert_eq!(february[0].amount.value(), 350_000.0);
    assert!(workspace.auth().remote_identity().unwrap().is_some());
}

#[test]
fn test_unremembered_session_dies_with_the_workspace() {
    let dir = TempDir::new().unwrap();
    {
        let workspace = Workspace::open(config(&dir)).unwrap();
        workspace
            .auth()
            .start_remote_session(&RemoteSession::new("user-1", "token"), false)
            .unwrap();
        assert!(workspace.auth().is_authorized().unwrap());
    }

    let workspace = Workspace::open(config(&dir)).unwrap();
    assert!(!workspace.auth().is_authorized().unwrap());
}

#[test]
fn test_workspace_quota_surfaces_notice() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::open(config(&dir).quota_bytes(64)).unwrap();

    let err = workspace.initialize().unwrap_err();

    assert!(matches!(err, StoreError::QuotaExceeded { .. }));
    let pending = workspace.notices().pending();
    assert!(!pending.is_empty());
    assert!(pending.iter().all(|n| n.level == NoticeLevel::Error));
}
