//! Money amounts as they appear in stored records.
//!
//! Older records carry amounts as formatted strings (`"200.000"`,
//! `"Rp 1.500,50"`), newer ones as JSON numbers. The raw value is kept
//! untouched on disk and coerced only when read.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Value);

impl Amount {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Numeric value; anything unparsable counts as zero.
    pub fn value(&self) -> f64 {
        coerce_amount(&self.0)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self(serde_json::Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<Value> for Amount {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

pub fn coerce_amount(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => coerce_amount_str(s),
        _ => 0.0,
    };
    if number.is_finite() { number } else { 0.0 }
}

/// `.` groups thousands and `,` marks decimals; a lone `.` followed by
/// anything other than three digits is read as a decimal point.
pub fn coerce_amount_str(raw: &str) -> f64 {
    let mut text = raw.trim();
    for prefix in ["Rp.", "Rp", "rp", "IDR", "idr"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return 0.0;
    }

    let normalized = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else if compact.matches('.').count() > 1 {
        compact.replace('.', "")
    } else if let Some((_, fraction)) = compact.split_once('.') {
        if fraction.len() == 3 && fraction.chars().all(|c| c.is_ascii_digit()) {
            compact.replace('.', "")
        } else {
            compact
        }
    } else {
        compact
    };

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_numbers_and_strings() {
        assert_eq!(coerce_amount(&json!(100000)), 100000.0);
        assert_eq!(coerce_amount(&json!("200.000")), 200000.0);
        assert_eq!(coerce_amount(&json!("1.250.000")), 1250000.0);
        assert_eq!(coerce_amount(&json!("Rp 1.500,5")), 1500.5);
        assert_eq!(coerce_amount(&json!("12.5")), 12.5);
        assert_eq!(coerce_amount(&json!(" 75000 ")), 75000.0);
    }

    #[test]
    fn test_unparsable_is_zero() {
        assert_eq!(coerce_amount(&json!("lunas")), 0.0);
        assert_eq!(coerce_amount(&json!("")), 0.0);
        assert_eq!(coerce_amount(&json!(null)), 0.0);
        assert_eq!(coerce_amount(&json!(true)), 0.0);
        assert_eq!(coerce_amount(&json!({"value": 10})), 0.0);
        assert_eq!(coerce_amount(&json!("NaN")), 0.0);
        assert_eq!(coerce_amount(&json!("inf")), 0.0);
    }
}
