//! Milestone endpoints.

use super::common::{SuccessResponse, parse_id, read_json_body};
use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use hitos_core::date::{
    deserialize_date, deserialize_optional_date, serialize_date, serialize_optional_date,
};
use hitos_core::int::deserialize_int;
use hitos_metadata::models::{MilestoneChanges, MilestoneWithStageRow, NewMilestone};
use serde::{Deserialize, Serialize};
use time::Date;

/// Milestone joined with its stage, as returned by the list endpoint.
#[derive(Debug, Serialize)]
pub struct MilestoneResponse {
    pub id: i64,
    pub item: i64,
    pub stage_id: i64,
    #[serde(serialize_with = "serialize_date")]
    pub start_date: Date,
    pub location: String,
    #[serde(serialize_with = "serialize_optional_date")]
    pub completion_date: Option<Date>,
    pub comments: Option<String>,
    pub illustration: Option<String>,
    pub stage_name: String,
    pub stage_color: String,
}

impl From<MilestoneWithStageRow> for MilestoneResponse {
    fn from(row: MilestoneWithStageRow) -> Self {
        Self {
            id: row.id,
            item: row.item,
            stage_id: row.stage_id,
            start_date: row.start_date,
            location: row.location,
            completion_date: row.completion_date,
            comments: row.comments,
            illustration: row.illustration,
            stage_name: row.stage_name,
            stage_color: row.stage_color,
        }
    }
}

/// Create milestone request.
#[derive(Debug, Deserialize)]
pub struct CreateMilestoneRequest {
    #[serde(deserialize_with = "deserialize_int")]
    pub item: i64,
    #[serde(deserialize_with = "deserialize_int")]
    pub stage_id: i64,
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: Date,
    pub location: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub completion_date: Option<Date>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub illustration: Option<String>,
}

/// Update milestone request. `item` is not accepted; it never changes.
#[derive(Debug, Deserialize)]
pub struct UpdateMilestoneRequest {
    #[serde(deserialize_with = "deserialize_int")]
    pub stage_id: i64,
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: Date,
    pub location: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub completion_date: Option<Date>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub illustration: Option<String>,
}

/// Create milestone response.
#[derive(Debug, Serialize)]
pub struct CreateMilestoneResponse {
    pub id: i64,
    pub success: bool,
}

/// GET /api/milestones - List milestones with stage name and color, by item.
pub async fn list_milestones(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MilestoneResponse>>> {
    let milestones = state
        .metadata
        .list_milestones()
        .await?
        .into_iter()
        .map(MilestoneResponse::from)
        .collect();
    Ok(Json(milestones))
}

/// POST /api/milestones - Create a milestone.
///
/// The stage id is not checked up front; the foreign key rejects unknown stages.
pub async fn create_milestone(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<CreateMilestoneResponse>)> {
    let body: CreateMilestoneRequest = read_json_body(req.into_body()).await?;

    let milestone = NewMilestone {
        item: body.item,
        stage_id: body.stage_id,
        start_date: body.start_date,
        location: body.location,
        completion_date: body.completion_date,
        comments: body.comments,
        illustration: body.illustration,
    };
    let id = state
        .metadata
        .create_milestone(&milestone)
        .await
        .inspect_err(|e| {
            if e.is_foreign_key_violation() {
                tracing::warn!(stage_id = milestone.stage_id, "Milestone refers to unknown stage");
            }
        })?;

    metrics::MILESTONES_CREATED.inc();
    tracing::info!(milestone_id = id, item = milestone.item, "Milestone created");

    Ok((
        StatusCode::CREATED,
        Json(CreateMilestoneResponse { id, success: true }),
    ))
}

/// PUT /api/milestones/{id} - Replace a milestone's fields except `item`.
///
/// Updating an unknown id succeeds without effect.
pub async fn update_milestone(
    State(state): State<AppState>,
    Path(milestone_id): Path<String>,
    req: Request,
) -> ApiResult<Json<SuccessResponse>> {
    let milestone_id = parse_id(&milestone_id, "milestone")?;
    let body: UpdateMilestoneRequest = read_json_body(req.into_body()).await?;

    let changes = MilestoneChanges {
        stage_id: body.stage_id,
        start_date: body.start_date,
        location: body.location,
        completion_date: body.completion_date,
        comments: body.comments,
        illustration: body.illustration,
    };
    let updated = state
        .metadata
        .update_milestone(milestone_id, &changes)
        .await?;

    metrics::MILESTONES_UPDATED.inc();
    tracing::info!(milestone_id, updated, "Milestone update executed");

    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/milestones/{id} - Delete a milestone.
pub async fn delete_milestone(
    State(state): State<AppState>,
    Path(milestone_id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let milestone_id = parse_id(&milestone_id, "milestone")?;

    let deleted = state.metadata.delete_milestone(milestone_id).await?;

    metrics::MILESTONES_DELETED.inc();
    tracing::info!(milestone_id, deleted, "Milestone delete executed");

    Ok(Json(SuccessResponse::ok()))
}
