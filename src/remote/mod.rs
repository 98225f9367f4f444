//! Remote relational backend, the one-way migration target.

pub mod error;
pub mod memory;
pub mod rest;
pub mod schema;

pub use error::{RemoteError, RemoteResult};
pub use memory::MemoryRemote;
pub use rest::RestRemote;
pub use schema::{OWNER_COLUMN, RemoteRow, RemoteTable};

use crate::auth::RemoteIdentity;
use async_trait::async_trait;
use std::sync::Arc;

/// Insert-only view of the remote store used by the migration engine.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert one row and return the identifier the backend assigned
    /// (or the `id` the row already carried).
    async fn insert(
        &self,
        identity: &RemoteIdentity,
        table: RemoteTable,
        row: RemoteRow,
    ) -> RemoteResult<String>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn insert(
        &self,
        identity: &RemoteIdentity,
        table: RemoteTable,
        row: RemoteRow,
    ) -> RemoteResult<String> {
        (**self).insert(identity, table, row).await
    }
}
