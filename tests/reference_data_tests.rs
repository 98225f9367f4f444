//! Reference data seeding, normalization and generated fields

use serde_json::json;
use std::sync::Arc;
use undangan::keys;
use undangan::model::{GeneralSettings, InvoiceItem};
use undangan::{
    Addon, Invoice, KeyValueStore, MemoryStore, Month, ReferenceStores, SharedStore, Vendor,
    WorkStatus,
};

fn setup() -> (SharedStore, ReferenceStores) {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let reference = ReferenceStores::new(store.clone());
    (store, reference)
}

#[test]
fn test_seeding_is_idempotent() {
    let (store, reference) = setup();

    let first = reference.ensure_seeded().unwrap();
    assert!(first.seeded.contains(&keys::WORK_STATUSES));
    assert!(first.seeded.contains(&keys::THEMES));
    let statuses = reference.work_statuses().list().unwrap();
    let addons = reference.addons().list().unwrap();
    let themes = reference.themes().unwrap();
    let snapshot: Vec<_> = [keys::VENDORS, keys::ADDONS, keys::THEMES, keys::PACKAGES, keys::WORK_STATUSES]
        .iter()
        .map(|key| store.get(key).unwrap())
        .collect();

    let second = reference.ensure_seeded().unwrap();
    assert!(second.is_noop());
    assert_eq!(reference.work_statuses().list().unwrap(), statuses);
    assert_eq!(reference.addons().list().unwrap(), addons);
    assert_eq!(reference.themes().unwrap(), themes);
    let again: Vec<_> = [keys::VENDORS, keys::ADDONS, keys::THEMES, keys::PACKAGES, keys::WORK_STATUSES]
        .iter()
        .map(|key| store.get(key).unwrap())
        .collect();
    assert_eq!(snapshot, again);
}

#[test]
fn test_seeding_leaves_existing_keys_alone() {
    let (store, reference) = setup();
    store.set(keys::ADDONS, "[]").unwrap();

    let report = reference.ensure_seeded().unwrap();

    assert!(!report.seeded.contains(&keys::ADDONS));
    assert!(reference.addons().list().unwrap().is_empty());
    assert!(!reference.packages().list().unwrap().is_empty());
}

#[test]
fn test_getters_never_write() {
    let (store, reference) = setup();

    assert!(reference.vendors().list().unwrap().is_empty());
    assert!(reference.themes().unwrap().is_empty());
    assert!(store.keys().unwrap().is_empty());
}

#[test]
fn test_legacy_themes_are_normalized_once() {
    let (store, reference) = setup();
    store
        .set(keys::THEMES_LEGACY, r#"["Elegant", {"id": "t-2", "name": "Rustic"}, ""]"#)
        .unwrap();

    let themes = reference.themes().unwrap();
    assert_eq!(themes.len(), 2);
    assert_eq!(themes[0].id, "Elegant");
    assert!(themes[1].matches("rustic"));

    let report = reference.ensure_seeded().unwrap();
    assert_eq!(report.normalized_themes, 2);
    assert!(!report.seeded.contains(&keys::THEMES));
    assert!(!store.contains(keys::THEMES_LEGACY).unwrap());
    assert_eq!(reference.themes().unwrap(), themes);
}

#[test]
fn test_checked_themes_report_unreadable_legacy_items() {
    let (store, reference) = setup();
    store
        .set(keys::THEMES_LEGACY, r#"["Elegant", {"id": "t-9", "name": 7}, 42]"#)
        .unwrap();

    let checked = reference.themes_checked().unwrap();
    assert_eq!(checked.records.len(), 1);
    assert_eq!(checked.records[0].name, "Elegant");
    let ids: Vec<Option<&str>> = checked.undecodable.iter().map(|u| u.id.as_deref()).collect();
    assert_eq!(ids, vec![Some("t-9"), None]);
    assert!(checked.undecodable.iter().all(|u| u.key == keys::THEMES_LEGACY));

    store.set(keys::THEMES_LEGACY, "not json").unwrap();
    let checked = reference.themes_checked().unwrap();
    assert!(checked.records.is_empty());
    assert_eq!(checked.undecodable.len(), 1);
    assert!(reference.themes().unwrap().is_empty());

    // a malformed legacy key is left for a later look, not normalized away
    let report = reference.ensure_seeded().unwrap();
    assert!(report.seeded.contains(&keys::THEMES));
    assert!(store.contains(keys::THEMES_LEGACY).unwrap());
}

#[test]
fn test_generated_codes_and_colors() {
    let (_store, reference) = setup();
    reference.ensure_seeded().unwrap();

    let first = reference.add_vendor(Vendor::named("Kartika")).unwrap();
    let second = reference.add_vendor(Vendor::named("Mawar")).unwrap();
    assert_eq!(first.code, "V001");
    assert_eq!(second.code, "V002");
    assert!(first.color.starts_with('#'));
    assert_ne!(first.color, second.color);

    let mut custom = Vendor::named("Melati");
    custom.code = "VIP".to_string();
    custom.color = "#000000".to_string();
    let custom = reference.add_vendor(custom).unwrap();
    assert_eq!(custom.code, "VIP");
    assert_eq!(custom.color, "#000000");

    // three seeded addons hold A001..A003
    let addon = reference.add_addon(Addon::named("Live Streaming", 150_000i64)).unwrap();
    assert_eq!(addon.code, "A004");

    let status = reference.add_work_status(WorkStatus::named("Arsip")).unwrap();
    assert_eq!(status.code, "WS005");
    assert_eq!(status.order, 5);
}

#[test]
fn test_codes_skip_taken_values_after_deletion() {
    let (_store, reference) = setup();
    let a = reference.add_vendor(Vendor::named("A")).unwrap();
    reference.add_vendor(Vendor::named("B")).unwrap();
    reference.vendors().remove(&a.id).unwrap();

    // one vendor left (V002), so the first candidate V002 is taken
    let c = reference.add_vendor(Vendor::named("C")).unwrap();
    assert_eq!(c.code, "V003");
}

#[test]
fn test_dimension_update_and_remove() {
    let (_store, reference) = setup();
    let vendor = reference.add_vendor(Vendor::named("Kartika")).unwrap();

    let updated = reference
        .vendors()
        .replace(&vendor.id, &json!({"phone": "0812"}))
        .unwrap()
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("0812"));
    assert_eq!(updated.code, vendor.code);

    assert!(reference.vendors().remove(&vendor.id).unwrap());
    assert!(reference.vendors().get(&vendor.id).unwrap().is_none());
}

#[test]
fn test_invoice_numbering() {
    let (_store, reference) = setup();
    reference.ensure_seeded().unwrap();

    let mut invoice = Invoice::default();
    invoice.issued_at = "2024-03-05".to_string();
    invoice.items.push(InvoiceItem::new("Paket Premium", 1, 199_000i64));
    let first = reference.add_invoice(invoice.clone()).unwrap();
    let second = reference.add_invoice(invoice).unwrap();

    assert_eq!(first.number, "INV/202403/001");
    assert_eq!(second.number, "INV/202403/002");
    assert_ne!(first.id, second.id);
    assert_eq!(reference.next_invoice_number(2024, Month::April).unwrap(), "INV/202404/001");
}

#[test]
fn test_settings_merge_over_defaults() {
    let (store, reference) = setup();
    store
        .set(keys::GENERAL_SETTINGS, r#"{"businessName": "Undangan Kita", "theme": "dark"}"#)
        .unwrap();

    let general = reference.general_settings().load().unwrap();
    assert_eq!(general.business_name, "Undangan Kita");
    assert_eq!(general.currency, GeneralSettings::default().currency);
    assert_eq!(general.extra.get("theme"), Some(&json!("dark")));

    let updated = reference
        .general_settings()
        .update(&json!({"ownerName": "Rina"}))
        .unwrap();
    assert_eq!(updated.owner_name, "Rina");
    assert_eq!(updated.business_name, "Undangan Kita");
}
