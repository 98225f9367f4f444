//! Record shapes as stored in local JSON (camelCase keys).
//!
//! Every record keeps fields it does not know about in `extra`, so a
//! read-modify-write never drops data written by another version.

pub mod dimension;
pub mod invoice;
pub mod order;
pub mod settings;
pub mod theme;
pub mod transaction;

pub use dimension::{Addon, Package, Vendor, WorkStatus};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use order::Order;
pub use settings::{BankAccount, GeneralSettings, InvoiceSettings};
pub use theme::{StoredTheme, Theme};
pub use transaction::{Transaction, TransactionCategory, TransactionKind};

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl crate::collection::Record for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn set_id(&mut self, id: String) {
                    self.id = id;
                }
            }
        )+
    };
}

impl_record!(
    Order,
    Transaction,
    TransactionCategory,
    Vendor,
    WorkStatus,
    Addon,
    Package,
    Theme,
    Invoice,
);
