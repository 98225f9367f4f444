//! Relational target schema.
//!
//! Dimension tables (`vendors`, `packages`, `themes`, `addons`,
//! `work_statuses`) are referenced by `orders`; `order_addons` joins orders
//! and addons; `invoice_items` depend on `invoices`. Every row carries a
//! `user_id` owner column.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

pub type RemoteRow = Map<String, Value>;

pub const OWNER_COLUMN: &str = "user_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemoteTable {
    Vendors,
    Themes,
    Addons,
    Packages,
    WorkStatuses,
    Orders,
    OrderAddons,
    Invoices,
    InvoiceItems,
    Transactions,
    Profiles,
    UserSettings,
}

impl RemoteTable {
    pub const ALL: [RemoteTable; 12] = [
        RemoteTable::Vendors,
        RemoteTable::Themes,
        RemoteTable::Addons,
        RemoteTable::Packages,
        RemoteTable::WorkStatuses,
        RemoteTable::Orders,
        RemoteTable::OrderAddons,
        RemoteTable::Invoices,
        RemoteTable::InvoiceItems,
        RemoteTable::Transactions,
        RemoteTable::Profiles,
        RemoteTable::UserSettings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RemoteTable::Vendors => "vendors",
            RemoteTable::Themes => "themes",
            RemoteTable::Addons => "addons",
            RemoteTable::Packages => "packages",
            RemoteTable::WorkStatuses => "work_statuses",
            RemoteTable::Orders => "orders",
            RemoteTable::OrderAddons => "order_addons",
            RemoteTable::Invoices => "invoices",
            RemoteTable::InvoiceItems => "invoice_items",
            RemoteTable::Transactions => "transactions",
            RemoteTable::Profiles => "profiles",
            RemoteTable::UserSettings => "user_settings",
        }
    }

    /// `(column, referenced table)` pairs of this table
    pub fn foreign_keys(self) -> &'static [(&'static str, RemoteTable)] {
        match self {
            RemoteTable::Orders => &[
                ("vendor_id", RemoteTable::Vendors),
                ("package_id", RemoteTable::Packages),
                ("theme_id", RemoteTable::Themes),
                ("work_status_id", RemoteTable::WorkStatuses),
            ],
            RemoteTable::OrderAddons => &[
                ("order_id", RemoteTable::Orders),
                ("addon_id", RemoteTable::Addons),
            ],
            RemoteTable::Invoices => &[("vendor_id", RemoteTable::Vendors)],
            RemoteTable::InvoiceItems => &[
                ("invoice_id", RemoteTable::Invoices),
                ("order_id", RemoteTable::Orders),
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for RemoteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for RemoteTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
