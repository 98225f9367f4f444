//! Local records to remote rows.
//!
//! Columns are snake_case; every row carries the owner column. Foreign keys
//! are translated through [`IdMap`] and become `null` when the referenced
//! local record never reached the remote store.

use crate::auth::RemoteIdentity;
use crate::core::{Amount, Month};
use crate::model::{
    Addon, GeneralSettings, Invoice, InvoiceItem, InvoiceSettings, Order, Package, Theme,
    Transaction, Vendor, WorkStatus,
};
use crate::remote::{OWNER_COLUMN, RemoteRow, RemoteTable};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Local id to remote id, per migrated table.
///
/// A local id that was migrated twice under different remote ids resolves
/// to nothing rather than to whichever insert finished last.
#[derive(Debug, Default, Clone)]
pub struct IdMap {
    tables: HashMap<RemoteTable, HashMap<String, String>>,
    theme_names: HashMap<String, String>,
    ambiguous: HashSet<(RemoteTable, String)>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: RemoteTable, local_id: &str, remote_id: &str) {
        let key = (table, local_id.to_string());
        if self.ambiguous.contains(&key) {
            return;
        }
        let ids = self.tables.entry(table).or_default();
        let conflicting = ids.get(local_id).is_some_and(|existing| existing != remote_id);
        if conflicting {
            warn!(
                table = %table,
                local_id,
                "local id migrated more than once; references to it become null"
            );
            ids.remove(local_id);
            self.ambiguous.insert(key);
        } else {
            ids.insert(local_id.to_string(), remote_id.to_string());
        }
    }

    /// Whether `local_id` was seen with conflicting remote ids
    pub fn is_ambiguous(&self, table: RemoteTable, local_id: &str) -> bool {
        self.ambiguous.contains(&(table, local_id.to_string()))
    }

    /// Registers a migrated theme under its name as well, for orders that
    /// still reference legacy string themes.
    pub fn insert_theme(&mut self, theme: &Theme, remote_id: &str) {
        self.insert(RemoteTable::Themes, &theme.id, remote_id);
        self.theme_names
            .insert(theme.name.trim().to_lowercase(), remote_id.to_string());
    }

    pub fn get(&self, table: RemoteTable, local_id: &str) -> Option<&str> {
        let remote = self.tables.get(&table)?.get(local_id)?;
        Some(remote.as_str())
    }

    pub fn len(&self, table: RemoteTable) -> usize {
        self.tables.get(&table).map_or(0, HashMap::len)
    }

    fn resolve(&self, table: RemoteTable, local_id: Option<&str>) -> Value {
        let Some(local_id) = local_id else {
            return Value::Null;
        };
        let found = self.get(table, local_id).or_else(|| {
            if table == RemoteTable::Themes {
                self.theme_names
                    .get(&local_id.trim().to_lowercase())
                    .map(String::as_str)
            } else {
                None
            }
        });
        found.map_or(Value::Null, Value::from)
    }
}

struct RowBuilder(RemoteRow);

impl RowBuilder {
    fn new(identity: &RemoteIdentity) -> Self {
        let mut row = RemoteRow::new();
        row.insert(OWNER_COLUMN.to_string(), Value::from(identity.user_id.as_str()));
        Self(row)
    }

    fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    fn text(self, column: &str, value: &str) -> Self {
        self.set(column, value)
    }

    fn opt(self, column: &str, value: Option<&str>) -> Self {
        self.set(column, value.map_or(Value::Null, Value::from))
    }

    fn money(self, column: &str, amount: &Amount) -> Self {
        self.set(column, amount.value())
    }

    fn metadata(self, extra: &Map<String, Value>) -> Self {
        if extra.is_empty() {
            self
        } else {
            self.set("metadata", Value::Object(extra.clone()))
        }
    }

    fn build(self) -> RemoteRow {
        self.0
    }
}

pub fn vendor_row(identity: &RemoteIdentity, vendor: &Vendor) -> RemoteRow {
    RowBuilder::new(identity)
        .text("name", &vendor.name)
        .text("code", &vendor.code)
        .text("color", &vendor.color)
        .opt("phone", vendor.phone.as_deref())
        .opt("notes", vendor.notes.as_deref())
        .metadata(&vendor.extra)
        .build()
}

/// The package reference is not carried: packages migrate after themes.
pub fn theme_row(identity: &RemoteIdentity, theme: &Theme) -> RemoteRow {
    RowBuilder::new(identity)
        .text("name", &theme.name)
        .opt("preview_url", theme.preview_url.as_deref())
        .metadata(&theme.extra)
        .build()
}

pub fn addon_row(identity: &RemoteIdentity, addon: &Addon) -> RemoteRow {
    RowBuilder::new(identity)
        .text("name", &addon.name)
        .text("code", &addon.code)
        .money("price", &addon.price)
        .text("color", &addon.color)
        .metadata(&addon.extra)
        .build()
}

pub fn package_row(identity: &RemoteIdentity, package: &Package) -> RemoteRow {
    RowBuilder::new(identity)
        .text("name", &package.name)
        .money("price", &package.price)
        .opt("description", package.description.as_deref())
        .set("features", package.features.clone())
        .metadata(&package.extra)
        .build()
}

pub fn work_status_row(identity: &RemoteIdentity, status: &WorkStatus) -> RemoteRow {
    RowBuilder::new(identity)
        .text("name", &status.name)
        .text("code", &status.code)
        .text("color", &status.color)
        .set("sort_order", status.order)
        .metadata(&status.extra)
        .build()
}

/// `partition` is the month shard the order was read from.
pub fn order_row(identity: &RemoteIdentity, order: &Order, partition: Month, ids: &IdMap) -> RemoteRow {
    RowBuilder::new(identity)
        .text("customer_name", &order.customer_name)
        .opt("event_date", order.event_date.as_deref())
        .text("month", partition.name())
        .set("vendor_id", ids.resolve(RemoteTable::Vendors, order.vendor_id.as_deref()))
        .set("package_id", ids.resolve(RemoteTable::Packages, order.package_id.as_deref()))
        .set("theme_id", ids.resolve(RemoteTable::Themes, order.theme_id.as_deref()))
        .set(
            "work_status_id",
            ids.resolve(RemoteTable::WorkStatuses, order.work_status_id.as_deref()),
        )
        .money("amount", &order.amount)
        .money("down_payment", &order.down_payment)
        .opt("notes", order.notes.as_deref())
        .opt("created_at", order.created_at.as_deref())
        .metadata(&order.extra)
        .build()
}

/// Join rows for the order's addons that resolved remotely; the rest are
/// dropped.
pub fn order_addon_rows(
    identity: &RemoteIdentity,
    order: &Order,
    order_remote_id: &str,
    ids: &IdMap,
) -> Vec<RemoteRow> {
    let mut seen = Vec::new();
    order
        .addon_ids
        .iter()
        .filter_map(|local| ids.get(RemoteTable::Addons, local))
        .filter(|remote| {
            let fresh = !seen.contains(remote);
            if fresh {
                seen.push(*remote);
            }
            fresh
        })
        .map(|addon_remote_id| {
            RowBuilder::new(identity)
                .text("order_id", order_remote_id)
                .text("addon_id", addon_remote_id)
                .build()
        })
        .collect()
}

pub fn invoice_row(identity: &RemoteIdentity, invoice: &Invoice, ids: &IdMap) -> RemoteRow {
    RowBuilder::new(identity)
        .text("number", &invoice.number)
        .set("vendor_id", ids.resolve(RemoteTable::Vendors, invoice.vendor_id.as_deref()))
        .text("issued_at", &invoice.issued_at)
        .opt("due_at", invoice.due_at.as_deref())
        .text("status", invoice.status.as_str())
        .opt("notes", invoice.notes.as_deref())
        .set("total", invoice.total())
        .metadata(&invoice.extra)
        .build()
}

pub fn invoice_item_row(
    identity: &RemoteIdentity,
    item: &InvoiceItem,
    invoice_remote_id: &str,
    ids: &IdMap,
) -> RemoteRow {
    RowBuilder::new(identity)
        .text("invoice_id", invoice_remote_id)
        .set("order_id", ids.resolve(RemoteTable::Orders, item.order_id.as_deref()))
        .text("description", &item.description)
        .set("quantity", item.quantity)
        .money("price", &item.price)
        .set("subtotal", item.subtotal())
        .build()
}

pub fn transaction_row(identity: &RemoteIdentity, tx: &Transaction, year: i32, month: Month) -> RemoteRow {
    RowBuilder::new(identity)
        .text("date", &tx.date)
        .text("type", tx.kind.as_str())
        .text("category", &tx.category)
        .money("amount", &tx.amount)
        .opt("description", tx.description.as_deref())
        .set("year", year)
        .text("month", month.name())
        .metadata(&tx.extra)
        .build()
}

pub fn profile_row(identity: &RemoteIdentity, general: &GeneralSettings) -> RemoteRow {
    RowBuilder::new(identity)
        .text("business_name", &general.business_name)
        .text("owner_name", &general.owner_name)
        .text("phone", &general.phone)
        .text("email", &general.email)
        .build()
}

pub fn user_settings_row(
    identity: &RemoteIdentity,
    general: &GeneralSettings,
    invoice: &InvoiceSettings,
) -> serde_json::Result<RemoteRow> {
    Ok(RowBuilder::new(identity)
        .set("general", serde_json::to_value(general)?)
        .set("invoice", serde_json::to_value(invoice)?)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> RemoteIdentity {
        RemoteIdentity {
            user_id: "owner-1".to_string(),
            access_token: "t".to_string(),
        }
    }

    #[test]
    fn test_order_row_resolves_foreign_keys() {
        let mut ids = IdMap::new();
        ids.insert(RemoteTable::Vendors, "v1", "rv1");
        let mut theme = Theme::named("Rustic");
        theme.id = "theme-rustic".to_string();
        ids.insert_theme(&theme, "rt1");

        let mut order = Order::new("Rina", "2024-01-20", "200.000");
        order.vendor_id = Some("v1".to_string());
        order.theme_id = Some("rustic".to_string());
        order.package_id = Some("gone".to_string());
        order.extra.insert("whatsapp".to_string(), json!("0812"));

        let row = order_row(&identity(), &order, Month::Januari, &ids);
        assert_eq!(row["user_id"], json!("owner-1"));
        assert_eq!(row["vendor_id"], json!("rv1"));
        assert_eq!(row["theme_id"], json!("rt1"));
        assert_eq!(row["package_id"], Value::Null);
        assert_eq!(row["work_status_id"], Value::Null);
        assert_eq!(row["amount"], json!(200000.0));
        assert_eq!(row["month"], json!("januari"));
        assert_eq!(row["metadata"]["whatsapp"], json!("0812"));
    }

    #[test]
    fn test_addon_rows_only_for_resolved_addons() {
        let mut ids = IdMap::new();
        ids.insert(RemoteTable::Addons, "a1", "ra1");
        let mut order = Order::new("Rina", "2024-01-20", 1i64);
        order.addon_ids = vec!["a1".to_string(), "a9".to_string(), "a1".to_string()];

        let rows = order_addon_rows(&identity(), &order, "ro1", &ids);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["order_id"], json!("ro1"));
        assert_eq!(rows[0]["addon_id"], json!("ra1"));
    }

    #[test]
    fn test_duplicated_local_id_resolves_to_null() {
        let mut ids = IdMap::new();
        ids.insert(RemoteTable::Orders, "o1", "ro-january");
        ids.insert(RemoteTable::Orders, "o2", "ro2");
        ids.insert(RemoteTable::Orders, "o2", "ro2");
        ids.insert(RemoteTable::Orders, "o1", "ro-march");
        ids.insert(RemoteTable::Orders, "o1", "ro-january");

        assert!(ids.is_ambiguous(RemoteTable::Orders, "o1"));
        assert_eq!(ids.get(RemoteTable::Orders, "o1"), None);
        assert_eq!(ids.get(RemoteTable::Orders, "o2"), Some("ro2"));
        assert_eq!(ids.len(RemoteTable::Orders), 1);

        let item = InvoiceItem::new("Paket Premium", 1, 199_000i64).for_order("o1".to_string());
        let row = invoice_item_row(&identity(), &item, "ri1", &ids);
        assert_eq!(row["order_id"], Value::Null);
        assert_eq!(row["invoice_id"], json!("ri1"));
    }
}
