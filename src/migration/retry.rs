use crate::auth::RemoteIdentity;
use crate::config::MigrationConfig;
use crate::remote::{RemoteError, RemoteResult, RemoteRow, RemoteStore, RemoteTable};
use tracing::{debug, warn};

/// Inserts one row, bounding each call by the request timeout and retrying
/// retryable failures with exponential backoff.
pub(crate) async fn insert_with_retry<S>(
    remote: &S,
    config: &MigrationConfig,
    identity: &RemoteIdentity,
    table: RemoteTable,
    row: RemoteRow,
) -> RemoteResult<String>
where
    S: RemoteStore + ?Sized,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        let call = remote.insert(identity, table, row.clone());
        let result = match tokio::time::timeout(config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(config.request_timeout.as_millis() as u64)),
        };

        match result {
            Ok(id) => {
                debug!(table = %table, attempt, remote_id = %id, "row inserted");
                return Ok(id);
            }
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let backoff = config.backoff_for(attempt);
                warn!(
                    table = %table,
                    attempt,
                    max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "remote insert failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn identity() -> RemoteIdentity {
        RemoteIdentity {
            user_id: "u-1".to_string(),
            access_token: "token".to_string(),
        }
    }

    fn row(name: &str) -> RemoteRow {
        let mut row = RemoteRow::new();
        row.insert("user_id".to_string(), json!("u-1"));
        row.insert("name".to_string(), Value::from(name));
        row
    }

    fn fast() -> MigrationConfig {
        MigrationConfig::new()
            .max_attempts(3)
            .backoff(Duration::from_millis(1), Duration::from_millis(4))
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let remote = MemoryRemote::new();
        remote.fail_transiently(RemoteTable::Vendors, 2).await;

        let id = insert_with_retry(&remote, &fast(), &identity(), RemoteTable::Vendors, row("A"))
            .await
            .unwrap();

        assert_eq!(remote.attempts(), 3);
        assert!(remote.find(RemoteTable::Vendors, &id).await.is_some());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let remote = MemoryRemote::new();
        remote.fail_transiently(RemoteTable::Vendors, 5).await;

        let err = insert_with_retry(&remote, &fast(), &identity(), RemoteTable::Vendors, row("A"))
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Status { status: 503, .. }));
        assert_eq!(remote.attempts(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let remote = MemoryRemote::new();
        remote.fail_when(RemoteTable::Vendors, "name", "A").await;

        let err = insert_with_retry(&remote, &fast(), &identity(), RemoteTable::Vendors, row("A"))
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Rejected(_)));
        assert_eq!(remote.attempts(), 1);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let remote = MemoryRemote::new().with_latency(Duration::from_millis(200));
        let config = fast()
            .max_attempts(2)
            .request_timeout(Duration::from_millis(10));

        let err = insert_with_retry(&remote, &config, &identity(), RemoteTable::Vendors, row("A"))
            .await
            .unwrap_err();

        assert_eq!(err, RemoteError::Timeout(10));
        assert_eq!(remote.attempts(), 2);
        assert_eq!(remote.count(RemoteTable::Vendors).await, 0);
    }
}
