//! Stage repository trait.

use crate::error::MetadataResult;
use crate::models::{NewStage, StageRow};
use async_trait::async_trait;

/// Repository for stage operations.
#[async_trait]
pub trait StageRepo: Send + Sync {
    /// List all stages ordered by ascending id.
    async fn list_stages(&self) -> MetadataResult<Vec<StageRow>>;

    /// Insert a stage and return it with its generated id.
    async fn create_stage(&self, stage: &NewStage) -> MetadataResult<StageRow>;

    /// Delete a stage by id. Returns the number of rows removed.
    ///
    /// Fails with a foreign-key violation if milestones still reference it.
    async fn delete_stage(&self, id: i64) -> MetadataResult<u64>;

    /// Count milestones referencing a stage.
    async fn count_milestones_for_stage(&self, stage_id: i64) -> MetadataResult<u64>;
}
