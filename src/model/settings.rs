//! Singleton settings objects. Stored objects are merged over these
//! defaults on read, so adding a field never requires rewriting storage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSettings {
    pub business_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub logo: Option<String>,
    pub accent_color: String,
    pub bank_accounts: Vec<BankAccount>,
    pub footer_note: String,
    pub due_days: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            business_name: "Undangan Digital".to_string(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            logo: None,
            accent_color: "#6366f1".to_string(),
            bank_accounts: Vec::new(),
            footer_note: "Terima kasih atas kepercayaan Anda.".to_string(),
            due_days: 7,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    pub business_name: String,
    pub owner_name: String,
    pub phone: String,
    pub email: String,
    pub currency: String,
    /// Year whose month shards hold the orders
    pub active_year: Option<i32>,
    pub dark_mode: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            business_name: "Undangan Digital".to_string(),
            owner_name: String::new(),
            phone: String::new(),
            email: String::new(),
            currency: "IDR".to_string(),
            active_year: None,
            dark_mode: false,
            extra: Map::new(),
        }
    }
}
