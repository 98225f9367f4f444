use super::shards::{YearMonthShards, transaction_shard};
use crate::collection::{Decoded, ShardScheme, ShardedCollection};
use crate::core::{Month, Result, StoreError};
use crate::keys;
use crate::model::Transaction;
use crate::storage::SharedStore;
use log::warn;
use serde_json::Value;
use std::ops::RangeInclusive;

/// Income/expense ledger sharded by `<year>_<month>`.
pub struct TransactionLedger {
    transactions: ShardedCollection<Transaction, YearMonthShards>,
}

impl TransactionLedger {
    pub fn new(store: SharedStore, years: RangeInclusive<i32>) -> Self {
        Self {
            transactions: ShardedCollection::new(store, keys::TRANSACTIONS, YearMonthShards::new(years)),
        }
    }

    pub fn collection(&self) -> &ShardedCollection<Transaction, YearMonthShards> {
        &self.transactions
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.transactions.scheme().years()
    }

    /// Adds a transaction; `year`/`month` are filled from the date so the
    /// record carries its own partition.
    pub fn add(&self, mut tx: Transaction) -> Result<Transaction> {
        let (year, month) = tx.period().ok_or_else(|| {
            StoreError::InvalidShard("transaction needs a date or year and month".into())
        })?;
        tx.year = Some(year);
        tx.month = Some(month);
        if !self.years().contains(&year) {
            warn!(
                "transaction year {} is outside {:?}; full reads will not see it",
                year,
                self.years()
            );
        }
        let shard = self.transactions.shard_of(&tx)?;
        self.transactions.append_to(tx, &shard)
    }

    pub fn get(&self, id: &str, year: i32, month: Month) -> Result<Option<Transaction>> {
        self.transactions.get(id, &transaction_shard(year, month))
    }

    /// Merges `patch`; the partition fields are not patchable.
    pub fn update(&self, id: &str, year: i32, month: Month, patch: &Value) -> Result<Option<Transaction>> {
        let mut patch = patch.clone();
        if let Value::Object(fields) = &mut patch {
            fields.remove("year");
            fields.remove("month");
        }
        self.transactions.replace(id, &patch, &transaction_shard(year, month))
    }

    pub fn delete(&self, id: &str, year: i32, month: Month) -> Result<bool> {
        self.transactions.remove(id, &transaction_shard(year, month))
    }

    pub fn list_month(&self, year: i32, month: Month) -> Result<Vec<Transaction>> {
        self.transactions.list_shard(&transaction_shard(year, month))
    }

    pub fn list_year(&self, year: i32) -> Result<Vec<Transaction>> {
        let shards: Vec<String> = Month::ALL.iter().map(|m| transaction_shard(year, *m)).collect();
        self.transactions.list_all(&shards)
    }

    /// Every shard in the configured year range.
    pub fn list_all(&self) -> Result<Vec<Transaction>> {
        self.transactions.list_all(&self.transactions.scheme().universe())
    }

    /// Non-empty shards in the configured range as `(year, month, records)`,
    /// including the elements that could not be decoded.
    pub fn by_period(&self) -> Result<Vec<(i32, Month, Decoded<Transaction>)>> {
        let mut out = Vec::new();
        for year in self.years() {
            for month in Month::ALL {
                let decoded = self
                    .transactions
                    .list_shard_checked(&transaction_shard(year, month))?;
                if !decoded.is_empty() {
                    out.push((year, month, decoded));
                }
            }
        }
        Ok(out)
    }
}
