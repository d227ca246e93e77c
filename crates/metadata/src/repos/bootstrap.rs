//! Default-data seeding repository.

use crate::error::MetadataResult;
use async_trait::async_trait;
use hitos_core::DefaultStage;

/// Repository for first-start seeding.
#[async_trait]
pub trait BootstrapRepo: Send + Sync {
    /// Insert `stages` in order if the stage table is empty.
    ///
    /// Returns the number of rows inserted (zero when stages already exist).
    async fn seed_default_stages(&self, stages: &[DefaultStage]) -> MetadataResult<u64>;
}
