//! Sharded collection properties over the order and transaction ledgers

use serde_json::json;
use std::sync::Arc;
use undangan::core::StoreError;
use undangan::{
    KeyValueStore, MemoryStore, Month, Order, OrderBook, SharedStore, Transaction,
    TransactionKind, TransactionLedger,
};

fn store() -> SharedStore {
    Arc::new(MemoryStore::new())
}

#[test]
fn test_append_lands_in_derived_shard() {
    let store = store();
    let book = OrderBook::new(store.clone());

    let order = book.add(Order::new("Rina & Dimas", "2024-08-17", 150_000i64)).unwrap();

    assert_eq!(order.month, Some(Month::Agustus));
    assert!(!order.id.is_empty());
    let shard = book.collection().shard_of(&order).unwrap();
    assert_eq!(shard, "agustus");
    assert_eq!(book.collection().shard_of(&order).unwrap(), shard);

    let listed = book.list_month(Month::Agustus).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, order.id);
    assert!(store.contains("orders_agustus").unwrap());
}

#[test]
fn test_replace_merges_fields() {
    let book = OrderBook::new(store());
    let mut order = Order::new("Sari", "2024-03-02", "500.000");
    order.notes = Some("pakai musik".to_string());
    let order = book.add(order).unwrap();
    book.add(Order::new("Budi", "2024-03-10", 1i64)).unwrap();

    let updated = book
        .update(&order.id, Month::Maret, &json!({"customerName": "Sari W."}))
        .unwrap()
        .unwrap();

    assert_eq!(updated.customer_name, "Sari W.");
    assert_eq!(updated.notes.as_deref(), Some("pakai musik"));
    assert_eq!(updated.amount.value(), 500_000.0);

    let matching: Vec<_> = book
        .list_month(Month::Maret)
        .unwrap()
        .into_iter()
        .filter(|o| o.id == order.id)
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0], updated);
}

#[test]
fn test_replace_missing_id_is_none() {
    let book = OrderBook::new(store());
    book.add(Order::new("Sari", "2024-03-02", 1i64)).unwrap();

    let result = book.update("nope", Month::Maret, &json!({"notes": "x"})).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_remove_deletes_exactly_one() {
    let book = OrderBook::new(store());
    let a = book.add(Order::new("A", "2024-05-01", 1i64)).unwrap();
    book.add(Order::new("B", "2024-05-02", 2i64)).unwrap();
    book.add(Order::new("C", "2024-05-03", 3i64)).unwrap();

    assert!(book.delete(&a.id, Month::Mei).unwrap());
    let remaining = book.list_month(Month::Mei).unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|o| o.id != a.id));

    assert!(!book.delete(&a.id, Month::Mei).unwrap());
    assert_eq!(book.list_month(Month::Mei).unwrap().len(), 2);
}

#[test]
fn test_duplicate_id_rejected() {
    let book = OrderBook::new(store());
    let mut order = Order::new("A", "2024-05-01", 1i64);
    order.id = "order-1".to_string();
    book.add(order.clone()).unwrap();

    let err = book.add(order).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId { ref id, .. } if id == "order-1"));
}

#[test]
fn test_same_id_in_another_month_rejected() {
    let store = store();
    let book = OrderBook::new(store.clone());
    let mut january = Order::new("A", "2024-01-10", 1i64);
    january.id = "order-1".to_string();
    book.add(january).unwrap();

    let mut march = Order::new("B", "2024-03-02", 2i64);
    march.id = "order-1".to_string();
    let err = book.add(march).unwrap_err();

    assert!(matches!(
        err,
        StoreError::DuplicateId { ref shard, ref id, .. } if shard == "januari" && id == "order-1"
    ));
    assert_eq!(store.get("orders_maret").unwrap(), None);
    assert_eq!(book.find("order-1").unwrap().unwrap().customer_name, "A");
}

#[test]
fn test_order_without_month_is_rejected() {
    let book = OrderBook::new(store());
    let err = book.add(Order::new("A", "soon", 1i64)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidShard(_)));
}

#[test]
fn test_update_keeps_shard_when_event_date_moves() {
    let book = OrderBook::new(store());
    let order = book.add(Order::new("A", "2024-01-10", 1i64)).unwrap();

    let updated = book
        .update(&order.id, Month::Januari, &json!({"eventDate": "2024-02-14", "month": "februari"}))
        .unwrap()
        .unwrap();

    assert_eq!(updated.event_date.as_deref(), Some("2024-02-14"));
    assert_eq!(updated.month, Some(Month::Januari));
    assert_eq!(book.list_month(Month::Januari).unwrap().len(), 1);
    assert!(book.list_month(Month::Februari).unwrap().is_empty());
}

#[test]
fn test_move_to_month() {
    let book = OrderBook::new(store());
    let order = book.add(Order::new("A", "2024-01-10", 1i64)).unwrap();

    let moved = book
        .move_to_month(&order.id, Month::Januari, Month::Februari)
        .unwrap()
        .unwrap();

    assert_eq!(moved.month, Some(Month::Februari));
    assert!(book.list_month(Month::Januari).unwrap().is_empty());
    assert_eq!(book.find(&order.id).unwrap().unwrap().month, Some(Month::Februari));
}

#[test]
fn test_malformed_shard_reads_empty() {
    let store = store();
    store.set("orders_juni", "{not json").unwrap();
    let book = OrderBook::new(store.clone());

    assert!(book.list_month(Month::Juni).unwrap().is_empty());
    assert!(book.list_all().unwrap().is_empty());
}

#[test]
fn test_undecodable_records_survive_writes() {
    let store = store();
    store
        .set("orders_juli", r#"[{"id": "x1", "customerName": "Lama", "eventDate": "2024-07-01"}, 42]"#)
        .unwrap();
    let book = OrderBook::new(store.clone());

    book.add(Order::new("Baru", "2024-07-09", 1i64)).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&store.get("orders_juli").unwrap().unwrap()).unwrap();
    assert_eq!(raw.as_array().unwrap().len(), 3);
    assert_eq!(book.list_month(Month::Juli).unwrap().len(), 2);
}

#[test]
fn test_checked_listing_reports_what_it_cannot_read() {
    let store = store();
    store
        .set(
            "orders_juli",
            r#"[{"id": "x1", "customerName": "Lama", "eventDate": "2024-07-01"}, 42, {"id": "legacy-1", "month": "Juli 2024"}]"#,
        )
        .unwrap();
    store.set("orders_juni", "{not json").unwrap();
    let book = OrderBook::new(store.clone());

    let shards = book.by_month().unwrap();
    let months: Vec<Month> = shards.iter().map(|(month, _)| *month).collect();
    assert_eq!(months, vec![Month::Juni, Month::Juli]);

    let (_, june) = &shards[0];
    assert!(june.records.is_empty());
    assert_eq!(june.undecodable.len(), 1);
    assert_eq!(june.undecodable[0].key, "orders_juni");
    assert_eq!(june.undecodable[0].id, None);

    let (_, july) = &shards[1];
    assert_eq!(july.records.len(), 1);
    assert_eq!(july.records[0].id, "x1");
    let ids: Vec<Option<&str>> = july.undecodable.iter().map(|u| u.id.as_deref()).collect();
    assert_eq!(ids, vec![None, Some("legacy-1")]);

    // the lenient reads keep skipping them
    assert_eq!(book.list_month(Month::Juli).unwrap().len(), 1);
    assert!(book.list_month(Month::Juni).unwrap().is_empty());
}

#[test]
fn test_initialize_writes_twelve_shards_once() {
    let store = store();
    let book = OrderBook::new(store.clone());

    assert_eq!(book.initialize().unwrap(), 12);
    assert_eq!(book.initialize().unwrap(), 0);
    for month in Month::ALL {
        assert_eq!(store.get(&format!("orders_{}", month)).unwrap().as_deref(), Some("[]"));
    }
}

#[test]
fn test_transactions_shard_by_year_and_month() {
    let store = store();
    let ledger = TransactionLedger::new(store.clone(), 2023..=2024);

    let tx = ledger
        .add(Transaction::new("2024-05-02", TransactionKind::Income, "DP", "1.000.000"))
        .unwrap();
    ledger
        .add(Transaction::new("2023-12-30", TransactionKind::Expense, "Iklan", 75_000i64))
        .unwrap();
    ledger
        .add(Transaction::new("2019-01-01", TransactionKind::Expense, "Lama", 1i64))
        .unwrap();

    assert_eq!(tx.year, Some(2024));
    assert_eq!(tx.month, Some(Month::Mei));
    assert!(store.contains("transactions_2024_mei").unwrap());
    assert_eq!(ledger.list_month(2024, Month::Mei).unwrap().len(), 1);
    assert_eq!(ledger.list_year(2023).unwrap().len(), 1);
    // 2019 is outside the configured range
    assert_eq!(ledger.list_all().unwrap().len(), 2);
    assert_eq!(ledger.list_year(2019).unwrap().len(), 1);

    let updated = ledger
        .update(&tx.id, 2024, Month::Mei, &json!({"description": "DP Rina", "year": 1999}))
        .unwrap()
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("DP Rina"));
    assert_eq!(updated.year, Some(2024));

    assert!(ledger.delete(&tx.id, 2024, Month::Mei).unwrap());
    assert!(ledger.list_month(2024, Month::Mei).unwrap().is_empty());
}
