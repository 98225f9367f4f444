use crate::collection::ShardScheme;
use crate::core::{Month, Result, StoreError};
use crate::model::{Order, Transaction};
use std::ops::RangeInclusive;

/// Orders: one shard per month name of the active year (12 fixed keys).
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthShards;

impl ShardScheme<Order> for MonthShards {
    fn shard_of(&self, order: &Order) -> Result<String> {
        order
            .effective_month()
            .map(|m| m.name().to_string())
            .ok_or_else(|| {
                StoreError::InvalidShard(format!(
                    "order '{}' has neither a month nor a parseable eventDate",
                    order.id
                ))
            })
    }

    fn universe(&self) -> Vec<String> {
        Month::ALL.iter().map(|m| m.name().to_string()).collect()
    }
}

/// Transactions: one shard per `<year>_<month>`.
///
/// The shard count grows without bound, so full reads cover only the
/// configured year range; years outside it are invisible to them.
#[derive(Debug, Clone)]
pub struct YearMonthShards {
    years: RangeInclusive<i32>,
}

impl YearMonthShards {
    pub fn new(years: RangeInclusive<i32>) -> Self {
        Self { years }
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.years.clone()
    }
}

pub fn transaction_shard(year: i32, month: Month) -> String {
    format!("{}_{}", year, month.name())
}

impl ShardScheme<Transaction> for YearMonthShards {
    fn shard_of(&self, tx: &Transaction) -> Result<String> {
        tx.period()
            .map(|(year, month)| transaction_shard(year, month))
            .ok_or_else(|| {
                StoreError::InvalidShard(format!(
                    "transaction '{}' has no year/month and no parseable date",
                    tx.id
                ))
            })
    }

    fn universe(&self) -> Vec<String> {
        self.years
            .clone()
            .flat_map(|year| Month::ALL.iter().map(move |m| transaction_shard(year, *m)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionKind;

    #[test]
    fn test_order_shard_is_deterministic() {
        let order = Order::new("Ayu", "2024-01-20", 100_000i64);
        assert_eq!(MonthShards.shard_of(&order).unwrap(), "januari");
        assert_eq!(MonthShards.shard_of(&order).unwrap(), "januari");

        let mut pinned = order.clone();
        pinned.month = Some(Month::Juni);
        assert_eq!(MonthShards.shard_of(&pinned).unwrap(), "juni");

        let undated = Order::default();
        assert!(MonthShards.shard_of(&undated).is_err());
    }

    #[test]
    fn test_transaction_universe() {
        let scheme = YearMonthShards::new(2023..=2024);
        let universe = scheme.universe();
        assert_eq!(universe.len(), 24);
        assert_eq!(universe[0], "2023_januari");
        assert_eq!(universe[23], "2024_desember");

        let tx = Transaction::new("2024-07-01", TransactionKind::Income, "Order", 1i64);
        assert_eq!(scheme.shard_of(&tx).unwrap(), "2024_juli");
    }
}
