//! Unsharded reference data: vendors, addons, themes, packages,
//! work-statuses, invoices, transaction categories and settings.
//!
//! Seeding is an explicit step ([`ReferenceStores::ensure_seeded`]); the
//! getters never write.

pub mod codes;
pub mod defaults;
pub mod settings;

use crate::collection::record::raw_id;
use crate::collection::{Decoded, Record, SingleCollection, Undecodable, new_id};
use crate::core::{Month, Result, parse_date};
use crate::keys;
use crate::model::{
    Addon, GeneralSettings, Invoice, InvoiceSettings, Package, StoredTheme, Theme,
    TransactionCategory, Vendor, WorkStatus,
};
use crate::storage::SharedStore;
use chrono::{Datelike, Local};
use log::{debug, warn};
use serde_json::Value;

pub use settings::SettingsStore;

/// Outcome of a seeding pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Keys written with defaults during this pass
    pub seeded: Vec<&'static str>,
    /// Legacy themes normalized into the versioned key
    pub normalized_themes: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        self.seeded.is_empty() && self.normalized_themes == 0
    }
}

/// What the pre-object themes key holds
enum LegacyThemes {
    Absent,
    Malformed(String),
    Stored(Decoded<Theme>),
}

pub struct ReferenceStores {
    store: SharedStore,
    vendors: SingleCollection<Vendor>,
    addons: SingleCollection<Addon>,
    themes: SingleCollection<Theme>,
    packages: SingleCollection<Package>,
    work_statuses: SingleCollection<WorkStatus>,
    invoices: SingleCollection<Invoice>,
    categories: SingleCollection<TransactionCategory>,
    invoice_settings: SettingsStore<InvoiceSettings>,
    general_settings: SettingsStore<GeneralSettings>,
}

impl ReferenceStores {
    pub fn new(store: SharedStore) -> Self {
        Self {
            vendors: SingleCollection::new(store.clone(), keys::VENDORS),
            addons: SingleCollection::new(store.clone(), keys::ADDONS),
            themes: SingleCollection::new(store.clone(), keys::THEMES),
            packages: SingleCollection::new(store.clone(), keys::PACKAGES),
            work_statuses: SingleCollection::new(store.clone(), keys::WORK_STATUSES),
            invoices: SingleCollection::new(store.clone(), keys::INVOICES),
            categories: SingleCollection::new(store.clone(), keys::TRANSACTION_CATEGORIES),
            invoice_settings: SettingsStore::new(store.clone(), keys::INVOICE_SETTINGS),
            general_settings: SettingsStore::new(store.clone(), keys::GENERAL_SETTINGS),
            store,
        }
    }

    /// Writes defaults for every reference key that is absent.
    ///
    /// Present keys are never touched, even when they hold an empty list,
    /// so running this twice is a no-op the second time.
    pub fn ensure_seeded(&self) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        seed(&self.vendors, Vec::new, keys::VENDORS, &mut report)?;
        seed(&self.addons, defaults::addons, keys::ADDONS, &mut report)?;
        seed(&self.packages, defaults::packages, keys::PACKAGES, &mut report)?;
        seed(&self.work_statuses, defaults::work_statuses, keys::WORK_STATUSES, &mut report)?;
        seed(&self.invoices, Vec::new, keys::INVOICES, &mut report)?;
        seed(
            &self.categories,
            defaults::transaction_categories,
            keys::TRANSACTION_CATEGORIES,
            &mut report,
        )?;

        if !self.themes.exists()? {
            match self.read_legacy_themes()? {
                LegacyThemes::Stored(Decoded { records: themes, .. }) => {
                    report.normalized_themes = themes.len();
                    self.themes.save(&themes)?;
                    self.store.remove(keys::THEMES_LEGACY)?;
                    debug!("normalized {} legacy themes into '{}'", themes.len(), keys::THEMES);
                }
                LegacyThemes::Absent | LegacyThemes::Malformed(_) => {
                    self.themes.save(&defaults::themes())?;
                    report.seeded.push(keys::THEMES);
                }
            }
        }

        Ok(report)
    }

    fn read_legacy_themes(&self) -> Result<LegacyThemes> {
        let Some(text) = self.store.get(keys::THEMES_LEGACY)? else {
            return Ok(LegacyThemes::Absent);
        };
        let stored: Vec<Value> = match serde_json::from_str(&text) {
            Ok(items) => items,
            Err(err) => {
                warn!("malformed legacy themes: {}", err);
                return Ok(LegacyThemes::Malformed(err.to_string()));
            }
        };

        let mut decoded = Decoded::default();
        for item in stored {
            let id = raw_id(&item);
            match serde_json::from_value::<StoredTheme>(item) {
                Ok(stored) => {
                    let theme = stored.normalize();
                    if !theme.name.is_empty() {
                        decoded.records.push(theme);
                    }
                }
                Err(err) => {
                    warn!("skipping undecodable legacy theme: {}", err);
                    decoded.undecodable.push(Undecodable {
                        key: keys::THEMES_LEGACY.to_string(),
                        id,
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(LegacyThemes::Stored(decoded))
    }

    pub fn vendors(&self) -> &SingleCollection<Vendor> {
        &self.vendors
    }

    pub fn addons(&self) -> &SingleCollection<Addon> {
        &self.addons
    }

    pub fn packages(&self) -> &SingleCollection<Package> {
        &self.packages
    }

    pub fn work_statuses(&self) -> &SingleCollection<WorkStatus> {
        &self.work_statuses
    }

    pub fn invoices(&self) -> &SingleCollection<Invoice> {
        &self.invoices
    }

    pub fn transaction_categories(&self) -> &SingleCollection<TransactionCategory> {
        &self.categories
    }

    pub fn invoice_settings(&self) -> &SettingsStore<InvoiceSettings> {
        &self.invoice_settings
    }

    pub fn general_settings(&self) -> &SettingsStore<GeneralSettings> {
        &self.general_settings
    }

    /// Themes in their current shape, normalizing legacy storage on the fly
    /// if seeding has not run yet.
    pub fn themes(&self) -> Result<Vec<Theme>> {
        Ok(self.themes_checked()?.records)
    }

    /// Like [`Self::themes`], but reports stored themes that could not be read.
    pub fn themes_checked(&self) -> Result<Decoded<Theme>> {
        if self.themes.exists()? {
            return self.themes.list_checked();
        }
        Ok(match self.read_legacy_themes()? {
            LegacyThemes::Absent => Decoded::default(),
            LegacyThemes::Malformed(error) => Decoded {
                records: Vec::new(),
                undecodable: vec![Undecodable {
                    key: keys::THEMES_LEGACY.to_string(),
                    id: None,
                    error,
                }],
            },
            LegacyThemes::Stored(decoded) => decoded,
        })
    }

    pub fn theme_collection(&self) -> &SingleCollection<Theme> {
        &self.themes
    }

    /// Adds a vendor, generating `code` and `color` when missing.
    pub fn add_vendor(&self, mut vendor: Vendor) -> Result<Vendor> {
        let existing = self.vendors.list()?;
        if vendor.code.trim().is_empty() {
            vendor.code = codes::next_code("V", existing.iter().map(|v| v.code.as_str()));
        }
        if vendor.color.trim().is_empty() {
            vendor.color = codes::pick_color(existing.iter().map(|v| v.color.as_str()));
        }
        self.vendors.append(vendor)
    }

    pub fn add_addon(&self, mut addon: Addon) -> Result<Addon> {
        let existing = self.addons.list()?;
        if addon.code.trim().is_empty() {
            addon.code = codes::next_code("A", existing.iter().map(|a| a.code.as_str()));
        }
        if addon.color.trim().is_empty() {
            addon.color = codes::pick_color(existing.iter().map(|a| a.color.as_str()));
        }
        self.addons.append(addon)
    }

    pub fn add_work_status(&self, mut status: WorkStatus) -> Result<WorkStatus> {
        let existing = self.work_statuses.list()?;
        if status.code.trim().is_empty() {
            status.code = codes::next_code("WS", existing.iter().map(|s| s.code.as_str()));
        }
        if status.color.trim().is_empty() {
            status.color = codes::pick_color(existing.iter().map(|s| s.color.as_str()));
        }
        if status.order == 0 {
            status.order = existing.iter().map(|s| s.order).max().unwrap_or(0) + 1;
        }
        self.work_statuses.append(status)
    }

    pub fn add_package(&self, package: Package) -> Result<Package> {
        self.packages.append(package)
    }

    pub fn add_theme(&self, theme: Theme) -> Result<Theme> {
        self.themes.append(theme)
    }

    /// Adds an invoice, numbering it from its issue date when unnumbered.
    pub fn add_invoice(&self, mut invoice: Invoice) -> Result<Invoice> {
        if invoice.id().is_empty() {
            invoice.set_id(new_id());
        }
        if invoice.issued_at.trim().is_empty() {
            invoice.issued_at = Local::now().date_naive().format("%Y-%m-%d").to_string();
        }
        if invoice.number.trim().is_empty() {
            let date = parse_date(&invoice.issued_at).unwrap_or_else(|| Local::now().date_naive());
            invoice.number = self.next_invoice_number(date.year(), Month::of_date(date))?;
        }
        self.invoices.append(invoice)
    }

    /// `INV/<year><MM>/<seq>` with the sequence restarting every month.
    pub fn next_invoice_number(&self, year: i32, month: Month) -> Result<String> {
        let prefix = format!("INV/{}{:02}/", year, month.number());
        let last = self
            .invoices
            .list()?
            .iter()
            .filter_map(|inv| inv.number.strip_prefix(&prefix).and_then(|s| s.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        Ok(format!("{}{:03}", prefix, last + 1))
    }
}

fn seed<R: Record>(
    collection: &SingleCollection<R>,
    defaults: impl FnOnce() -> Vec<R>,
    key: &'static str,
    report: &mut SeedReport,
) -> Result<()> {
    if collection.exists()? {
        return Ok(());
    }
    collection.save(&defaults())?;
    report.seeded.push(key);
    Ok(())
}
