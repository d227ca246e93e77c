//! Database models mapping to the stage/milestone schema.

use sqlx::FromRow;
use time::Date;

// =============================================================================
// Stages
// =============================================================================

/// Stage record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StageRow {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// Fields of a stage to insert. The id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewStage {
    pub name: String,
    pub color: String,
}

// =============================================================================
// Milestones
// =============================================================================

/// Milestone joined with the name and color of its stage.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MilestoneWithStageRow {
    pub id: i64,
    /// Caller-supplied ordering number (not unique).
    pub item: i64,
    pub stage_id: i64,
    pub start_date: Date,
    pub location: String,
    pub completion_date: Option<Date>,
    pub comments: Option<String>,
    /// URL or path of an uploaded image.
    pub illustration: Option<String>,
    pub stage_name: String,
    pub stage_color: String,
}

/// Fields of a milestone to insert.
#[derive(Debug, Clone)]
pub struct NewMilestone {
    pub item: i64,
    pub stage_id: i64,
    pub start_date: Date,
    pub location: String,
    pub completion_date: Option<Date>,
    pub comments: Option<String>,
    pub illustration: Option<String>,
}

/// Full replacement of a milestone's mutable fields. `item` is not included.
#[derive(Debug, Clone)]
pub struct MilestoneChanges {
    pub stage_id: i64,
    pub start_date: Date,
    pub location: String,
    pub completion_date: Option<Date>,
    pub comments: Option<String>,
    pub illustration: Option<String>,
}
