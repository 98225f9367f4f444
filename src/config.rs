use crate::auth::DemoAccount;
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote backend endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
}

/// Migration tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Concurrent remote inserts within a phase
    pub workers: usize,

    /// Per-call timeout
    #[serde(with = "duration_ms")]
    pub request_timeout: Duration,

    /// Attempts per row before it is recorded as failed
    pub max_attempts: u32,

    /// First retry delay; doubles per attempt
    #[serde(with = "duration_ms")]
    pub base_backoff: Duration,

    /// Retry delay cap
    #[serde(with = "duration_ms")]
    pub max_backoff: Duration,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            request_timeout: Duration::from_secs(8),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl MigrationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count (at least one)
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the per-call timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set attempts per row (at least one)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the backoff window
    pub fn backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff = base;
        self.max_backoff = max.max(base);
        self
    }

    /// Delay before retry number `attempt` (1-based), doubling up to the cap.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self.base_backoff.as_millis().max(1) as u64;
        let cap = (self.max_backoff.as_millis() as u64).max(base);

        let mut backoff = base;
        for _ in 1..attempt {
            backoff = backoff.saturating_mul(2).min(cap);
        }
        Duration::from_millis(backoff)
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory of the durable local store
    pub data_dir: PathBuf,

    /// Byte limit of the local store (`None` = unlimited)
    pub quota_bytes: Option<usize>,

    /// Year whose month shards hold the orders
    pub active_year: i32,

    /// Inclusive year range walked by full transaction reads
    pub transaction_years: (i32, i32),

    pub remote: Option<RemoteConfig>,

    pub migration: MigrationConfig,

    pub demo: DemoAccount,
}

impl Default for AppConfig {
    fn default() -> Self {
        let year = Local::now().year();
        Self {
            data_dir: PathBuf::from("./undangan-data"),
            quota_bytes: None,
            active_year: year,
            transaction_years: (year - 5, year + 1),
            remote: None,
            migration: MigrationConfig::default(),
            demo: DemoAccount::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the local store quota
    pub fn quota_bytes(mut self, quota: usize) -> Self {
        self.quota_bytes = Some(quota);
        self
    }

    /// Set the active year
    pub fn active_year(mut self, year: i32) -> Self {
        self.active_year = year;
        self
    }

    /// Set the transaction year range
    pub fn transaction_years(mut self, from: i32, to: i32) -> Self {
        self.transaction_years = (from.min(to), from.max(to));
        self
    }

    /// Set the remote backend
    pub fn remote(mut self, url: &str, api_key: &str) -> Self {
        self.remote = Some(RemoteConfig {
            url: url.to_string(),
            api_key: api_key.to_string(),
        });
        self
    }

    /// Set migration tuning
    pub fn migration(mut self, migration: MigrationConfig) -> Self {
        self.migration = migration;
        self
    }

    /// Set the demo account
    pub fn demo(mut self, demo: DemoAccount) -> Self {
        self.demo = demo;
        self
    }

    pub fn transaction_year_range(&self) -> RangeInclusive<i32> {
        let (from, to) = self.transaction_years;
        from.min(to)..=from.max(to)
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config '{}': {}", path.display(), e))?;
        let config = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// Overlay `UNDANGAN_*` environment variables.
    pub fn from_env(self) -> anyhow::Result<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if let Some(dir) = var("UNDANGAN_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(year) = var("UNDANGAN_ACTIVE_YEAR") {
            self.active_year = year
                .parse()
                .map_err(|_| anyhow::anyhow!("UNDANGAN_ACTIVE_YEAR must be a year, got '{}'", year))?;
        }
        if let Some(workers) = var("UNDANGAN_MIGRATION_WORKERS") {
            let workers: usize = workers
                .parse()
                .map_err(|_| anyhow::anyhow!("UNDANGAN_MIGRATION_WORKERS must be a number"))?;
            self.migration = self.migration.workers(workers);
        }
        match (var("UNDANGAN_REMOTE_URL"), var("UNDANGAN_REMOTE_KEY")) {
            (Some(url), Some(key)) => self = self.remote(&url, &key),
            (Some(url), None) => {
                let key = self.remote.as_ref().map(|r| r.api_key.clone()).unwrap_or_default();
                self = self.remote(&url, &key);
            }
            _ => {}
        }
        Ok(self)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
