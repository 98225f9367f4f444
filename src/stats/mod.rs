//! Dashboard statistics folded from fully materialized record lists.
//!
//! Everything here is a pure function of its inputs. Sums are accumulated
//! in fixed point (thousandths) so the result does not depend on input
//! order.

pub mod orders;
pub mod transactions;

pub use orders::{OrderStats, order_stats};
pub use transactions::{TransactionStats, transaction_stats};

use crate::core::Month;
use serde::Serialize;
use std::collections::BTreeMap;

/// Group key for records without a reference
pub const UNASSIGNED: &str = "unassigned";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsFilter {
    pub year: Option<i32>,
    pub month: Option<Month>,
}

impl StatsFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            month: None,
        }
    }

    pub fn month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }
}

/// Order-independent money accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Sum(i128);

impl Sum {
    pub(crate) fn add(&mut self, value: f64) {
        self.0 += (value * 1000.0).round() as i128;
    }

    pub(crate) fn value(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Tally {
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Default)]
pub(crate) struct Grouping {
    groups: BTreeMap<String, (usize, Sum)>,
}

impl Grouping {
    pub(crate) fn add(&mut self, key: Option<&str>, amount: f64) {
        let key = key.filter(|k| !k.is_empty()).unwrap_or(UNASSIGNED);
        let entry = self.groups.entry(key.to_string()).or_default();
        entry.0 += 1;
        entry.1.add(amount);
    }

    pub(crate) fn finish(self) -> BTreeMap<String, Tally> {
        self.groups
            .into_iter()
            .map(|(key, (count, sum))| {
                (
                    key,
                    Tally {
                        count,
                        amount: sum.value(),
                    },
                )
            })
            .collect()
    }
}

/// Bucket layout: twelve months, or the days of the selected month. Without
/// a year the month gets its longest length, so February has 29 buckets.
pub(crate) fn buckets(filter: &StatsFilter) -> Vec<(u32, String)> {
    match filter.month {
        None => Month::ALL
            .iter()
            .map(|m| (m.number(), m.name().to_string()))
            .collect(),
        Some(month) => {
            let days = filter.year.map_or_else(|| month.max_days(), |year| month.days_in(year));
            (1..=days).map(|d| (d, d.to_string())).collect()
        }
    }
}
