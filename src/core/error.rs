use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, limit {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Record '{id}' already exists in {collection}_{shard}")]
    DuplicateId {
        collection: String,
        shard: String,
        id: String,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid shard: {0}")]
    InvalidShard(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid username or password")]
    InvalidCredentials,
}

impl StoreError {
    /// Faults caused by the storage medium rather than by the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. } | Self::Serialization(_) | Self::Io(_) | Self::Lock(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
