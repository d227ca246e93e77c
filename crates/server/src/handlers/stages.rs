//! Stage endpoints.

use super::common::{SuccessResponse, parse_id, read_json_body};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use hitos_core::DEFAULT_STAGE_COLOR;
use hitos_metadata::models::{NewStage, StageRow};
use serde::{Deserialize, Serialize};

/// Stage as returned by the API.
#[derive(Debug, Serialize)]
pub struct StageResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
}

impl From<StageRow> for StageResponse {
    fn from(row: StageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
        }
    }
}

/// Create stage request. A missing or null color takes the default.
#[derive(Debug, Deserialize)]
pub struct CreateStageRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// GET /api/stages - List all stages by id.
pub async fn list_stages(State(state): State<AppState>) -> ApiResult<Json<Vec<StageResponse>>> {
    let stages = state
        .metadata
        .list_stages()
        .await?
        .into_iter()
        .map(StageResponse::from)
        .collect();
    Ok(Json(stages))
}

/// POST /api/stages - Create a stage.
pub async fn create_stage(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<StageResponse>)> {
    let body: CreateStageRequest = read_json_body(req.into_body()).await?;

    let stage = NewStage {
        name: body.name,
        color: body
            .color
            .unwrap_or_else(|| DEFAULT_STAGE_COLOR.to_string()),
    };
    let row = state.metadata.create_stage(&stage).await?;

    metrics::STAGES_CREATED.inc();
    tracing::info!(stage_id = row.id, name = %row.name, "Stage created");

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// DELETE /api/stages/{id} - Delete a stage no milestone references.
///
/// Deleting an unknown id succeeds.
pub async fn delete_stage(
    State(state): State<AppState>,
    Path(stage_id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let stage_id = parse_id(&stage_id, "stage")?;

    let in_use = state.metadata.count_milestones_for_stage(stage_id).await?;
    if in_use > 0 {
        metrics::STAGE_DELETES_BLOCKED.inc();
        tracing::info!(stage_id, milestones = in_use, "Stage delete refused, stage in use");
        return Err(ApiError::BadRequest(format!(
            "cannot delete stage: {in_use} milestone(s) still use it; \
             reassign or delete them first"
        )));
    }

    let deleted = state.metadata.delete_stage(stage_id).await?;

    metrics::STAGES_DELETED.inc();
    tracing::info!(stage_id, deleted, "Stage delete executed");

    Ok(Json(SuccessResponse::ok()))
}
