//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Flat object store for uploaded files.
///
/// Keys are single file names; nested paths are rejected by backends.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an entire object.
    ///
    /// Anything at the key that is not a regular file is reported as not found.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Write an object only if the key is free.
    ///
    /// Returns `Ok(false)` when an object already exists. Readers never
    /// observe a partially written object.
    async fn put_if_not_exists(&self, key: &str, data: Bytes) -> StorageResult<bool>;

    /// Backend name used in logs.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is usable.
    ///
    /// The default implementation returns Ok(()).
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
