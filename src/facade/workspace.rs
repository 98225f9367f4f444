use crate::auth::AuthBridge;
use crate::config::AppConfig;
use crate::core::Result;
use crate::ledger::{OrderBook, TransactionLedger};
use crate::migration::Migrator;
use crate::reference::{ReferenceStores, SeedReport};
use crate::remote::{RemoteError, RemoteResult, RemoteStore, RestRemote};
use crate::stats::{OrderStats, StatsFilter, TransactionStats, order_stats, transaction_stats};
use crate::storage::{FileStore, GuardedStore, MemoryStore, NoticeBoard, SharedStore};
use log::info;
use std::sync::Arc;

/// Everything built on one local store.
///
/// The durable store is wrapped in a [`GuardedStore`] so storage faults
/// reach the notice board. The remote session of a "don't remember me"
/// login lives in a separate in-memory store that dies with the process.
pub struct Workspace {
    config: AppConfig,
    store: SharedStore,
    notices: Arc<NoticeBoard>,
    reference: ReferenceStores,
    orders: OrderBook,
    transactions: TransactionLedger,
    auth: Arc<AuthBridge>,
}

impl Workspace {
    /// Opens the file-backed store under `config.data_dir`.
    pub fn open(config: AppConfig) -> Result<Self> {
        let mut files = FileStore::open(&config.data_dir)?;
        if let Some(quota) = config.quota_bytes {
            files = files.with_quota(quota);
        }
        info!("opened local store at {}", config.data_dir.display());
        Ok(Self::with_store(config, files))
    }

    /// Workspace over a fresh in-memory store.
    pub fn in_memory(config: AppConfig) -> Self {
        let memory = match config.quota_bytes {
            Some(quota) => MemoryStore::with_quota(quota),
            None => MemoryStore::new(),
        };
        Self::with_store(config, memory)
    }

    pub fn with_store<S>(config: AppConfig, durable: S) -> Self
    where
        S: crate::storage::KeyValueStore + 'static,
    {
        let notices = Arc::new(NoticeBoard::new());
        let store: SharedStore = Arc::new(GuardedStore::new(durable, notices.clone()));
        let ephemeral: SharedStore = Arc::new(MemoryStore::new());

        Self {
            reference: ReferenceStores::new(store.clone()),
            orders: OrderBook::new(store.clone()),
            transactions: TransactionLedger::new(store.clone(), config.transaction_year_range()),
            auth: Arc::new(AuthBridge::new(store.clone(), ephemeral, config.demo.clone())),
            store,
            notices,
            config,
        }
    }

    /// Seeds reference data and the twelve order shards. Safe to repeat.
    pub fn initialize(&self) -> Result<SeedReport> {
        let report = self.reference.ensure_seeded()?;
        let shards = self.orders.initialize()?;
        if !report.is_noop() || shards > 0 {
            info!("initialized local store: seeded {:?}, {} new order shards", report.seeded, shards);
        }
        Ok(report)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn notices(&self) -> &Arc<NoticeBoard> {
        &self.notices
    }

    pub fn reference(&self) -> &ReferenceStores {
        &self.reference
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    pub fn transactions(&self) -> &TransactionLedger {
        &self.transactions
    }

    pub fn auth(&self) -> &Arc<AuthBridge> {
        &self.auth
    }

    pub fn order_stats(&self, filter: &StatsFilter) -> Result<OrderStats> {
        let orders = match filter.month {
            Some(month) => self.orders.list_month(month)?,
            None => self.orders.list_all()?,
        };
        Ok(order_stats(&orders, filter))
    }

    pub fn transaction_stats(&self, filter: &StatsFilter) -> Result<TransactionStats> {
        let transactions = match (filter.year, filter.month) {
            (Some(year), Some(month)) => self.transactions.list_month(year, month)?,
            (Some(year), None) => self.transactions.list_year(year)?,
            _ => self.transactions.list_all()?,
        };
        Ok(transaction_stats(&transactions, filter))
    }

    /// REST backend from the configured endpoint.
    pub fn rest_remote(&self) -> RemoteResult<RestRemote> {
        let remote = self.config.remote.as_ref().ok_or(RemoteError::NotConfigured)?;
        RestRemote::new(&remote.url, &remote.api_key, self.config.migration.request_timeout)
    }

    pub fn migrator(&self, remote: Arc<dyn RemoteStore>) -> Migrator {
        Migrator::new(self.store.clone(), self.auth.clone(), remote)
            .with_config(self.config.migration.clone())
            .with_years(self.config.transaction_year_range())
    }
}
