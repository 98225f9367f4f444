//! Local key layout.

pub const VENDORS: &str = "vendors";
pub const ADDONS: &str = "addons";
/// Pre-object themes (array of strings); read once and normalized into [`THEMES`].
pub const THEMES_LEGACY: &str = "themes";
pub const THEMES: &str = "themes_v2";
pub const PACKAGES: &str = "packages";
pub const WORK_STATUSES: &str = "workStatuses";
pub const INVOICES: &str = "invoices";
pub const INVOICE_SETTINGS: &str = "invoiceSettings";
pub const GENERAL_SETTINGS: &str = "generalSettings";
pub const TRANSACTION_CATEGORIES: &str = "transactionCategories";

/// Prefix of the twelve `orders_<month>` shards
pub const ORDERS: &str = "orders";
/// Prefix of the `transactions_<year>_<month>` shards
pub const TRANSACTIONS: &str = "transactions";

pub const AUTH: &str = "auth";
pub const REMOTE_SESSION: &str = "remoteSession";
pub const REMEMBER_ME: &str = "rememberMe";

/// Keys that survive a local cutover after migration.
pub const SESSION_KEYS: [&str; 3] = [AUTH, REMOTE_SESSION, REMEMBER_ME];
