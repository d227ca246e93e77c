//! Milestone repository trait.

use crate::error::MetadataResult;
use crate::models::{MilestoneChanges, MilestoneWithStageRow, NewMilestone};
use async_trait::async_trait;

/// Repository for milestone operations.
#[async_trait]
pub trait MilestoneRepo: Send + Sync {
    /// List all milestones joined with their stage, ordered by `item` then `id`.
    async fn list_milestones(&self) -> MetadataResult<Vec<MilestoneWithStageRow>>;

    /// Insert a milestone and return its generated id.
    async fn create_milestone(&self, milestone: &NewMilestone) -> MetadataResult<i64>;

    /// Overwrite every mutable field of a milestone. Returns rows affected.
    async fn update_milestone(&self, id: i64, changes: &MilestoneChanges) -> MetadataResult<u64>;

    /// Delete a milestone by id. Returns rows affected.
    async fn delete_milestone(&self, id: i64) -> MetadataResult<u64>;
}
