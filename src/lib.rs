// ============================================================================
// Undangan: local order/invoice/transaction store with remote cutover
// ============================================================================

pub mod auth;
pub mod collection;
pub mod config;
pub mod core;
pub mod facade;
pub mod keys;
pub mod ledger;
pub mod migration;
pub mod model;
pub mod reference;
pub mod remote;
pub mod stats;
pub mod storage;

// Re-export main types for convenience
pub use auth::{AuthBridge, AuthStatus, DemoAccount, LocalSession, RemoteIdentity, RemoteSession};
pub use collection::{Record, ShardScheme, ShardedCollection, SingleCollection};
pub use config::{AppConfig, MigrationConfig, RemoteConfig};
pub use core::{Amount, Month, Result, StoreError, coerce_amount};
pub use facade::Workspace;
pub use ledger::{MonthShards, OrderBook, TransactionLedger, YearMonthShards};
pub use migration::{
    MigrationFailure, MigrationOutcome, MigrationPhase, MigrationProgress, MigrationReport, Migrator,
};
pub use model::{
    Addon, Invoice, InvoiceItem, InvoiceStatus, Order, Package, Theme, Transaction,
    TransactionKind, Vendor, WorkStatus,
};
pub use reference::{ReferenceStores, SeedReport};
pub use remote::{MemoryRemote, RemoteError, RemoteStore, RemoteTable, RestRemote};
pub use stats::{OrderStats, StatsFilter, TransactionStats, order_stats, transaction_stats};
pub use storage::{FileStore, GuardedStore, KeyValueStore, MemoryStore, NoticeBoard, SharedStore};
