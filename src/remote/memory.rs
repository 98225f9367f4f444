use super::schema::{OWNER_COLUMN, RemoteRow, RemoteTable};
use super::{RemoteError, RemoteResult, RemoteStore};
use crate::auth::RemoteIdentity;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Injected failure for one table
#[derive(Debug, Clone)]
struct FailureRule {
    table: RemoteTable,
    /// Only rows whose `column` equals `value`; `None` matches every row
    matcher: Option<(String, Value)>,
    error: RemoteError,
    /// Remaining failures; `None` fails forever
    remaining: Option<usize>,
}

/// In-memory relational backend.
///
/// Enforces the owner column and the schema's foreign keys the way the
/// real backend does, and can be told to fail or stall specific inserts.
#[derive(Default)]
pub struct MemoryRemote {
    tables: RwLock<HashMap<RemoteTable, Vec<RemoteRow>>>,
    rules: RwLock<Vec<FailureRule>>,
    latency: Option<Duration>,
    attempts: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every insert sleeps this long before completing
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Permanently reject inserts into `table` whose `column` equals `value`
    pub async fn fail_when(&self, table: RemoteTable, column: &str, value: impl Into<Value>) {
        self.rules.write().await.push(FailureRule {
            table,
            matcher: Some((column.to_string(), value.into())),
            error: RemoteError::Rejected(format!("simulated failure on {}.{}", table, column)),
            remaining: None,
        });
    }

    /// Fail the next `times` inserts into `table` with a retryable error
    pub async fn fail_transiently(&self, table: RemoteTable, times: usize) {
        self.rules.write().await.push(FailureRule {
            table,
            matcher: None,
            error: RemoteError::Status {
                status: 503,
                body: "simulated outage".to_string(),
            },
            remaining: Some(times),
        });
    }

    pub async fn rows(&self, table: RemoteTable) -> Vec<RemoteRow> {
        self.tables.read().await.get(&table).cloned().unwrap_or_default()
    }

    pub async fn count(&self, table: RemoteTable) -> usize {
        self.tables.read().await.get(&table).map_or(0, Vec::len)
    }

    pub async fn find(&self, table: RemoteTable, id: &str) -> Option<RemoteRow> {
        self.tables
            .read()
            .await
            .get(&table)?
            .iter()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
            .cloned()
    }

    /// Total insert calls, including failed and retried ones
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn injected_failure(&self, table: RemoteTable, row: &RemoteRow) -> Option<RemoteError> {
        let mut rules = self.rules.write().await;
        for rule in rules.iter_mut() {
            if rule.table != table {
                continue;
            }
            let matches = match &rule.matcher {
                Some((column, value)) => row.get(column) == Some(value),
                None => true,
            };
            if !matches {
                continue;
            }
            if let Some(remaining) = rule.remaining.as_mut() {
                if *remaining == 0 {
                    continue;
                }
                *remaining -= 1;
            }
            return Some(rule.error.clone());
        }
        None
    }
}

fn check_foreign_keys(
    tables: &HashMap<RemoteTable, Vec<RemoteRow>>,
    table: RemoteTable,
    row: &RemoteRow,
) -> RemoteResult<()> {
    for (column, target) in table.foreign_keys() {
        let Some(value) = row.get(*column).and_then(Value::as_str) else {
            continue;
        };
        let exists = tables.get(target).is_some_and(|rows| {
            rows.iter()
                .any(|r| r.get("id").and_then(Value::as_str) == Some(value))
        });
        if !exists {
            return Err(RemoteError::ForeignKey {
                table: table.name().to_string(),
                column: column.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn insert(
        &self,
        identity: &RemoteIdentity,
        table: RemoteTable,
        mut row: RemoteRow,
    ) -> RemoteResult<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if row.get(OWNER_COLUMN).and_then(Value::as_str) != Some(identity.user_id.as_str()) {
            return Err(RemoteError::Rejected(format!(
                "row for {} is not owned by the caller",
                table
            )));
        }
        if let Some(err) = self.injected_failure(table, &row).await {
            return Err(err);
        }

        let mut tables = self.tables.write().await;
        check_foreign_keys(&tables, table, &row)?;

        let id = match row.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                row.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        let rows = tables.entry(table).or_default();
        if rows.iter().any(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str())) {
            return Err(RemoteError::Rejected(format!("duplicate key {}.id = '{}'", table, id)));
        }
        rows.push(row);
        Ok(id)
    }
}
