use super::{Grouping, StatsFilter, Sum, Tally, buckets};
use crate::model::{Transaction, TransactionKind};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CashflowPoint {
    pub bucket: u32,
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionStats {
    pub count: usize,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub income_by_category: BTreeMap<String, Tally>,
    pub expense_by_category: BTreeMap<String, Tally>,
    pub series: Vec<CashflowPoint>,
}

fn selected(tx: &Transaction, filter: &StatsFilter) -> bool {
    let Some((year, month)) = tx.period() else {
        return filter.year.is_none() && filter.month.is_none();
    };
    filter.year.is_none_or(|y| y == year) && filter.month.is_none_or(|m| m == month)
}

pub fn transaction_stats(transactions: &[Transaction], filter: &StatsFilter) -> TransactionStats {
    let layout = buckets(filter);
    let mut series: Vec<(Sum, Sum)> = vec![(Sum::default(), Sum::default()); layout.len()];

    let mut income = Sum::default();
    let mut expense = Sum::default();
    let mut count = 0usize;
    let mut income_groups = Grouping::default();
    let mut expense_groups = Grouping::default();

    for tx in transactions.iter().filter(|t| selected(t, filter)) {
        let amount = tx.amount.value();
        count += 1;

        let bucket = match filter.month {
            None => tx.period().map(|(_, m)| m.number()),
            Some(_) => crate::core::parse_date(&tx.date).map(|d| d.day()),
        };
        let slot = bucket.and_then(|b| layout.iter().position(|(n, _)| *n == b));

        match tx.kind {
            TransactionKind::Income => {
                income.add(amount);
                income_groups.add(Some(tx.category.as_str()), amount);
                if let Some(slot) = slot {
                    series[slot].0.add(amount);
                }
            }
            TransactionKind::Expense => {
                expense.add(amount);
                expense_groups.add(Some(tx.category.as_str()), amount);
                if let Some(slot) = slot {
                    series[slot].1.add(amount);
                }
            }
        }
    }

    TransactionStats {
        count,
        income: income.value(),
        expense: expense.value(),
        balance: income.value() - expense.value(),
        income_by_category: income_groups.finish(),
        expense_by_category: expense_groups.finish(),
        series: layout
            .into_iter()
            .zip(series)
            .map(|((bucket, label), (inc, exp))| CashflowPoint {
                bucket,
                label,
                income: inc.value(),
                expense: exp.value(),
            })
            .collect(),
    }
}
