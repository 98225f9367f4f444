use crate::collection::record::id_string;
use crate::core::{Amount, Month, parse_date};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    #[serde(alias = "pemasukan", alias = "in")]
    Income,
    #[serde(alias = "pengeluaran", alias = "out")]
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn new(
        date: impl Into<String>,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Self {
            date: date.into(),
            kind,
            category: category.into(),
            amount: amount.into(),
            ..Self::default()
        }
    }

    /// Partition of the record: explicit `year`/`month` first, then the date.
    pub fn period(&self) -> Option<(i32, Month)> {
        let from_date = parse_date(&self.date);
        let year = self.year.or_else(|| from_date.map(|d| d.year()))?;
        let month = self.month.or_else(|| from_date.map(Month::of_date))?;
        Some((year, month))
    }

    /// Signed contribution to the balance
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount.value(),
            TransactionKind::Expense => -self.amount.value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCategory {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_prefers_explicit_fields() {
        let mut tx = Transaction::new("2024-05-02", TransactionKind::Expense, "Iklan", 50_000i64);
        assert_eq!(tx.period(), Some((2024, Month::Mei)));

        tx.year = Some(2023);
        tx.month = Some(Month::Desember);
        assert_eq!(tx.period(), Some((2023, Month::Desember)));
        assert_eq!(tx.signed_amount(), -50_000.0);
    }

    #[test]
    fn test_period_requires_a_date_or_fields() {
        let tx = Transaction::new("", TransactionKind::Income, "Order", 1i64);
        assert_eq!(tx.period(), None);
    }
}
