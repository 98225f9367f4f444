use crate::collection::record::{id_string, opt_id_string};
use crate::core::{Amount, Month, parse_date};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    /// Month shard the order lives in; fixed at insertion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
    #[serde(default, deserialize_with = "opt_id_string", skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string", skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string", skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string", skip_serializing_if = "Option::is_none")]
    pub work_status_id: Option<String>,
    #[serde(default, deserialize_with = "id_list")]
    pub addon_ids: Vec<String>,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub down_payment: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    pub fn new(customer_name: impl Into<String>, event_date: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            customer_name: customer_name.into(),
            event_date: Some(event_date.into()),
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn event_day(&self) -> Option<NaiveDate> {
        self.event_date.as_deref().and_then(parse_date)
    }

    /// Stored shard month, falling back to the event date.
    pub fn effective_month(&self) -> Option<Month> {
        self.month.or_else(|| self.event_day().map(Month::of_date))
    }

    pub fn outstanding(&self) -> f64 {
        (self.amount.value() - self.down_payment.value()).max(0.0)
    }
}

fn id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_legacy_order() {
        let order: Order = serde_json::from_value(json!({
            "id": 1700000000000u64,
            "customerName": "Rina & Dimas",
            "eventDate": "2024-03-09",
            "vendorId": "",
            "addonIds": [3, "a2", ""],
            "amount": "250.000",
            "whatsapp": "0812"
        }))
        .unwrap();

        assert_eq!(order.id, "1700000000000");
        assert_eq!(order.vendor_id, None);
        assert_eq!(order.addon_ids, vec!["3".to_string(), "a2".to_string()]);
        assert_eq!(order.amount.value(), 250000.0);
        assert_eq!(order.effective_month(), Some(Month::Maret));
        assert_eq!(order.extra.get("whatsapp"), Some(&json!("0812")));

        let back = serde_json::to_value(&order).unwrap();
        assert_eq!(back["whatsapp"], json!("0812"));
        assert_eq!(back["amount"], json!("250.000"));
    }
}
