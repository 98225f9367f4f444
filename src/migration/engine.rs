use super::mapping::{self, IdMap};
use super::progress::{MigrationPhase, MigrationProgress};
use super::report::{MigrationFailure, MigrationOutcome, MigrationReport};
use super::retry::insert_with_retry;
use crate::auth::{AuthBridge, RemoteIdentity};
use crate::collection::{Decoded, ShardScheme, Undecodable};
use crate::config::{AppConfig, MigrationConfig};
use crate::core::{Month, Result};
use crate::keys;
use crate::ledger::{OrderBook, TransactionLedger};
use crate::model::{
    Addon, GeneralSettings, Invoice, InvoiceSettings, Order, Package, Theme, Transaction, Vendor,
    WorkStatus,
};
use crate::reference::ReferenceStores;
use crate::remote::{RemoteError, RemoteRow, RemoteStore, RemoteTable};
use crate::storage::SharedStore;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::future::Future;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};

/// Everything the migration reads, taken before the first remote write.
struct LocalSnapshot {
    vendors: Vec<Vendor>,
    themes: Vec<Theme>,
    addons: Vec<Addon>,
    packages: Vec<Package>,
    work_statuses: Vec<WorkStatus>,
    orders: Vec<(Month, Order)>,
    invoices: Vec<Invoice>,
    transactions: Vec<(i32, Month, Transaction)>,
    general: GeneralSettings,
    invoice_settings: InvoiceSettings,
    /// Stored entries that could not be read; each counts as a failed unit
    undecodable: Vec<(RemoteTable, Undecodable)>,
    /// Order and transaction shard keys the snapshot walked
    shard_keys: HashSet<String>,
}

/// Profile and user settings rows
const SETTINGS_UNITS: usize = 2;

fn checked<R>(table: RemoteTable, decoded: Decoded<R>, undecodable: &mut Vec<(RemoteTable, Undecodable)>) -> Vec<R> {
    undecodable.extend(decoded.undecodable.into_iter().map(|u| (table, u)));
    decoded.records
}

impl LocalSnapshot {
    fn read(store: &SharedStore, years: RangeInclusive<i32>) -> Result<Self> {
        let reference = ReferenceStores::new(store.clone());
        let order_book = OrderBook::new(store.clone());
        let ledger = TransactionLedger::new(store.clone(), years);
        let mut undecodable = Vec::new();

        let mut shard_keys: HashSet<String> = Month::ALL
            .iter()
            .map(|month| order_book.collection().key_for(month.name()))
            .collect();
        shard_keys.extend(
            ledger
                .collection()
                .scheme()
                .universe()
                .iter()
                .map(|shard| ledger.collection().key_for(shard)),
        );

        let mut orders = Vec::new();
        for (month, decoded) in order_book.by_month()? {
            let records = checked(RemoteTable::Orders, decoded, &mut undecodable);
            orders.extend(records.into_iter().map(|order| (month, order)));
        }
        let mut transactions = Vec::new();
        for (year, month, decoded) in ledger.by_period()? {
            let records = checked(RemoteTable::Transactions, decoded, &mut undecodable);
            transactions.extend(records.into_iter().map(|tx| (year, month, tx)));
        }

        let vendors = checked(RemoteTable::Vendors, reference.vendors().list_checked()?, &mut undecodable);
        let themes = checked(RemoteTable::Themes, reference.themes_checked()?, &mut undecodable);
        let addons = checked(RemoteTable::Addons, reference.addons().list_checked()?, &mut undecodable);
        let packages = checked(RemoteTable::Packages, reference.packages().list_checked()?, &mut undecodable);
        let work_statuses = checked(
            RemoteTable::WorkStatuses,
            reference.work_statuses().list_checked()?,
            &mut undecodable,
        );
        let invoices = checked(RemoteTable::Invoices, reference.invoices().list_checked()?, &mut undecodable);

        let (general, unreadable) = reference.general_settings().load_checked()?;
        undecodable.extend(unreadable.map(|u| (RemoteTable::Profiles, u)));
        let (invoice_settings, unreadable) = reference.invoice_settings().load_checked()?;
        undecodable.extend(unreadable.map(|u| (RemoteTable::UserSettings, u)));

        Ok(Self {
            vendors,
            themes,
            addons,
            packages,
            work_statuses,
            orders,
            invoices,
            transactions,
            general,
            invoice_settings,
            undecodable,
            shard_keys,
        })
    }

    /// Units of work; an order with its addon rows and an invoice with its
    /// items each count once.
    fn unit_count(&self) -> usize {
        self.vendors.len()
            + self.themes.len()
            + self.addons.len()
            + self.packages.len()
            + self.work_statuses.len()
            + self.orders.len()
            + self.invoices.len()
            + self.transactions.len()
            + SETTINGS_UNITS
            + self.undecodable.len()
    }

    fn undecodable_in<'a>(&'a self, tables: &'a [RemoteTable]) -> impl Iterator<Item = (RemoteTable, &'a Undecodable)> {
        self.undecodable
            .iter()
            .filter(move |(table, _)| tables.contains(table))
            .map(|(table, u)| (*table, u))
    }
}

/// Result of one unit. A unit whose primary row landed but whose dependent
/// rows failed still reports the remote id so later phases can reference it.
struct UnitOutcome {
    local_id: String,
    remote_id: Option<String>,
    failure: Option<MigrationFailure>,
}

impl UnitOutcome {
    fn inserted(local_id: String, remote_id: String) -> Self {
        Self {
            local_id,
            remote_id: Some(remote_id),
            failure: None,
        }
    }

    fn failed(table: RemoteTable, local_id: String, error: &RemoteError) -> Self {
        Self::rejected(table, local_id, error.to_string())
    }

    fn rejected(table: RemoteTable, local_id: String, error: String) -> Self {
        Self {
            failure: Some(MigrationFailure {
                table,
                local_id: local_id.clone(),
                error,
            }),
            local_id,
            remote_id: None,
        }
    }

    /// A stored entry that never reached the wire
    fn undecodable(table: RemoteTable, entry: &Undecodable) -> Self {
        let local_id = entry.id.clone().unwrap_or_else(|| entry.key.clone());
        Self::rejected(
            table,
            local_id,
            format!("undecodable local data under '{}': {}", entry.key, entry.error),
        )
    }
}

struct Run<'a, F> {
    progress: MigrationProgress,
    failures: Vec<MigrationFailure>,
    on_progress: &'a mut F,
}

impl<F: FnMut(&MigrationProgress)> Run<'_, F> {
    fn record(&mut self, outcome: UnitOutcome) -> Option<(String, String)> {
        match outcome.failure {
            Some(failure) => {
                warn!(
                    table = %failure.table,
                    local_id = %failure.local_id,
                    error = %failure.error,
                    "entity not migrated"
                );
                self.progress.failed += 1;
                self.failures.push(failure);
            }
            None => self.progress.completed += 1,
        }
        (self.on_progress)(&self.progress);
        outcome.remote_id.map(|remote| (outcome.local_id, remote))
    }

    fn record_undecodable<'s>(&mut self, entries: impl Iterator<Item = (RemoteTable, &'s Undecodable)>) {
        for (table, entry) in entries {
            self.record(UnitOutcome::undecodable(table, entry));
        }
    }
}

/// One-way migration of the local store into the remote backend.
///
/// Phases run in a fixed order so that every foreign key points at a row
/// migrated earlier: dimensions, orders, invoices (each followed by its
/// items), transactions, then the profile and settings rows. Units within
/// a phase run with bounded concurrency.
pub struct Migrator {
    store: SharedStore,
    auth: Arc<AuthBridge>,
    remote: Arc<dyn RemoteStore>,
    config: MigrationConfig,
    years: RangeInclusive<i32>,
}

impl Migrator {
    pub fn new(store: SharedStore, auth: Arc<AuthBridge>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            auth,
            remote,
            config: MigrationConfig::default(),
            years: AppConfig::default().transaction_year_range(),
        }
    }

    pub fn with_config(mut self, config: MigrationConfig) -> Self {
        self.config = config;
        self
    }

    /// Transaction years to walk
    pub fn with_years(mut self, years: RangeInclusive<i32>) -> Self {
        self.years = years;
        self
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Runs the migration.
    ///
    /// Without a live remote session nothing is read or written and the
    /// report says `NotAuthenticated`. Individual insert failures never
    /// abort the run. Local keys (other than the session keys) are removed
    /// only when `clear_local_on_success` is set and every unit succeeded.
    ///
    /// `Err` is reserved for local storage faults while reading the
    /// snapshot, before any remote write.
    pub async fn migrate<F>(&self, clear_local_on_success: bool, mut on_progress: F) -> Result<MigrationReport>
    where
        F: FnMut(&MigrationProgress) + Send,
    {
        let Some(identity) = self.auth.remote_identity()? else {
            warn!("migration requested without a remote session");
            return Ok(MigrationReport::not_authenticated());
        };

        let snapshot = LocalSnapshot::read(&self.store, self.years.clone())?;
        let total = snapshot.unit_count();
        let span = info_span!("migration.run", user_id = %identity.user_id, total);

        let report = async {
            info!(workers = self.config.workers, "migration started");
            let mut run = Run {
                progress: MigrationProgress::new(total),
                failures: Vec::new(),
                on_progress: &mut on_progress,
            };
            self.run_phases(&identity, &snapshot, &mut run).await;

            let outcome = if run.failures.is_empty() {
                MigrationOutcome::Success
            } else {
                MigrationOutcome::PartialFailure
            };
            let mut report = MigrationReport {
                outcome,
                completed: run.progress.completed,
                failed: run.progress.failed,
                total,
                failures: std::mem::take(&mut run.failures),
                cleared_keys: Vec::new(),
                kept_keys: Vec::new(),
                clear_error: None,
            };
            info!(completed = report.completed, failed = report.failed, "migration finished");

            if clear_local_on_success {
                if report.success() {
                    run.progress.phase = MigrationPhase::Cleanup;
                    (run.on_progress)(&run.progress);
                    match self.clear_local(&snapshot.shard_keys) {
                        Ok((cleared, kept)) => {
                            info!(keys = cleared.len(), "local data cleared");
                            if !kept.is_empty() {
                                warn!(keys = ?kept, "shards outside the migrated range kept locally");
                            }
                            report.cleared_keys = cleared;
                            report.kept_keys = kept;
                        }
                        Err(err) => {
                            warn!(error = %err, "failed to clear local data");
                            report.clear_error = Some(err.to_string());
                        }
                    }
                } else {
                    info!("local data kept: migration did not fully succeed");
                }
            }
            report
        }
        .instrument(span)
        .await;
        Ok(report)
    }

    async fn run_phases<F>(&self, identity: &RemoteIdentity, snapshot: &LocalSnapshot, run: &mut Run<'_, F>)
    where
        F: FnMut(&MigrationProgress),
    {
        let mut ids = IdMap::new();

        let vendors = snapshot.vendors.iter().map(|vendor| {
            let row = mapping::vendor_row(identity, vendor);
            self.insert_unit(identity, RemoteTable::Vendors, vendor.id.clone(), row)
        });
        for (local, remote) in self.run_phase(run, MigrationPhase::Vendors, vendors).await {
            ids.insert(RemoteTable::Vendors, &local, &remote);
        }
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::Vendors]));

        let themes = snapshot.themes.iter().map(|theme| {
            let row = mapping::theme_row(identity, theme);
            self.insert_unit(identity, RemoteTable::Themes, theme.id.clone(), row)
        });
        for (local, remote) in self.run_phase(run, MigrationPhase::Themes, themes).await {
            if let Some(theme) = snapshot.themes.iter().find(|t| t.id == local) {
                ids.insert_theme(theme, &remote);
            }
        }
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::Themes]));

        let addons = snapshot.addons.iter().map(|addon| {
            let row = mapping::addon_row(identity, addon);
            self.insert_unit(identity, RemoteTable::Addons, addon.id.clone(), row)
        });
        for (local, remote) in self.run_phase(run, MigrationPhase::Addons, addons).await {
            ids.insert(RemoteTable::Addons, &local, &remote);
        }
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::Addons]));

        let packages = snapshot.packages.iter().map(|package| {
            let row = mapping::package_row(identity, package);
            self.insert_unit(identity, RemoteTable::Packages, package.id.clone(), row)
        });
        for (local, remote) in self.run_phase(run, MigrationPhase::Packages, packages).await {
            ids.insert(RemoteTable::Packages, &local, &remote);
        }
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::Packages]));

        let statuses = snapshot.work_statuses.iter().map(|status| {
            let row = mapping::work_status_row(identity, status);
            self.insert_unit(identity, RemoteTable::WorkStatuses, status.id.clone(), row)
        });
        for (local, remote) in self.run_phase(run, MigrationPhase::WorkStatuses, statuses).await {
            ids.insert(RemoteTable::WorkStatuses, &local, &remote);
        }
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::WorkStatuses]));

        let dimensions = &ids;
        let orders = snapshot
            .orders
            .iter()
            .map(|(month, order)| self.migrate_order(identity, order, *month, dimensions));
        let migrated_orders = self.run_phase(run, MigrationPhase::Orders, orders).await;
        for (local, remote) in migrated_orders {
            ids.insert(RemoteTable::Orders, &local, &remote);
        }
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::Orders]));

        let refs = &ids;
        let invoices = snapshot
            .invoices
            .iter()
            .map(|invoice| self.migrate_invoice(identity, invoice, refs));
        self.run_phase(run, MigrationPhase::Invoices, invoices).await;
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::Invoices]));

        let transactions = snapshot.transactions.iter().map(|(year, month, tx)| {
            let row = mapping::transaction_row(identity, tx, *year, *month);
            self.insert_unit(identity, RemoteTable::Transactions, tx.id.clone(), row)
        });
        self.run_phase(run, MigrationPhase::Transactions, transactions).await;
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::Transactions]));

        run.progress.phase = MigrationPhase::Profile;
        run.record_undecodable(snapshot.undecodable_in(&[RemoteTable::Profiles, RemoteTable::UserSettings]));
        let profile = mapping::profile_row(identity, &snapshot.general);
        let profile = self
            .insert_unit(identity, RemoteTable::Profiles, identity.user_id.clone(), profile)
            .await;
        run.record(profile);

        let settings = match mapping::user_settings_row(identity, &snapshot.general, &snapshot.invoice_settings) {
            Ok(row) => {
                self.insert_unit(identity, RemoteTable::UserSettings, keys::GENERAL_SETTINGS.to_string(), row)
                    .await
            }
            Err(err) => UnitOutcome::failed(
                RemoteTable::UserSettings,
                keys::GENERAL_SETTINGS.to_string(),
                &RemoteError::Decode(err.to_string()),
            ),
        };
        run.record(settings);
    }

    /// Drives one phase and returns `(local id, remote id)` of every unit
    /// whose primary row was inserted.
    async fn run_phase<F, I, Fut>(&self, run: &mut Run<'_, F>, phase: MigrationPhase, units: I) -> Vec<(String, String)>
    where
        F: FnMut(&MigrationProgress),
        I: Iterator<Item = Fut>,
        Fut: Future<Output = UnitOutcome>,
    {
        run.progress.phase = phase;
        info!(phase = %phase, "migration phase started");

        let mut inserted = Vec::new();
        let mut outcomes = stream::iter(units).buffer_unordered(self.config.workers.max(1));
        while let Some(outcome) = outcomes.next().await {
            if let Some(pair) = run.record(outcome) {
                inserted.push(pair);
            }
        }
        inserted
    }

    async fn insert_unit(
        &self,
        identity: &RemoteIdentity,
        table: RemoteTable,
        local_id: String,
        row: RemoteRow,
    ) -> UnitOutcome {
        match insert_with_retry(self.remote.as_ref(), &self.config, identity, table, row).await {
            Ok(remote_id) => UnitOutcome::inserted(local_id, remote_id),
            Err(err) => UnitOutcome::failed(table, local_id, &err),
        }
    }

    /// The order row, then one join row per resolved addon.
    async fn migrate_order(&self, identity: &RemoteIdentity, order: &Order, month: Month, ids: &IdMap) -> UnitOutcome {
        let row = mapping::order_row(identity, order, month, ids);
        let mut outcome = self
            .insert_unit(identity, RemoteTable::Orders, order.id.clone(), row)
            .await;
        let Some(order_remote_id) = outcome.remote_id.clone() else {
            return outcome;
        };

        for join in mapping::order_addon_rows(identity, order, &order_remote_id, ids) {
            if let Err(err) =
                insert_with_retry(self.remote.as_ref(), &self.config, identity, RemoteTable::OrderAddons, join).await
            {
                outcome.failure = Some(MigrationFailure {
                    table: RemoteTable::OrderAddons,
                    local_id: order.id.clone(),
                    error: err.to_string(),
                });
                break;
            }
        }
        outcome
    }

    /// The invoice row, then its items in order. Items of an invoice that
    /// failed are never sent.
    async fn migrate_invoice(&self, identity: &RemoteIdentity, invoice: &Invoice, ids: &IdMap) -> UnitOutcome {
        let row = mapping::invoice_row(identity, invoice, ids);
        let mut outcome = self
            .insert_unit(identity, RemoteTable::Invoices, invoice.id.clone(), row)
            .await;
        let Some(invoice_remote_id) = outcome.remote_id.clone() else {
            return outcome;
        };

        for item in &invoice.items {
            let row = mapping::invoice_item_row(identity, item, &invoice_remote_id, ids);
            if let Err(err) =
                insert_with_retry(self.remote.as_ref(), &self.config, identity, RemoteTable::InvoiceItems, row).await
            {
                outcome.failure = Some(MigrationFailure {
                    table: RemoteTable::InvoiceItems,
                    local_id: invoice.id.clone(),
                    error: err.to_string(),
                });
                break;
            }
        }
        outcome
    }

    /// Removes every local key except the session keys and order or
    /// transaction shards the snapshot never walked. Returns the cleared and
    /// the kept keys, both sorted.
    fn clear_local(&self, walked: &HashSet<String>) -> Result<(Vec<String>, Vec<String>)> {
        let order_prefix = format!("{}_", keys::ORDERS);
        let transaction_prefix = format!("{}_", keys::TRANSACTIONS);
        let mut cleared = Vec::new();
        let mut kept = Vec::new();
        for key in self.store.keys()? {
            if keys::SESSION_KEYS.contains(&key.as_str()) {
                continue;
            }
            let is_shard = key.starts_with(&order_prefix) || key.starts_with(&transaction_prefix);
            if is_shard && !walked.contains(&key) {
                kept.push(key);
                continue;
            }
            self.store.remove(&key)?;
            cleared.push(key);
        }
        cleared.sort();
        kept.sort();
        Ok((cleared, kept))
    }
}
