//! HTTP handlers for the restock schedule

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{ClientInfo, CurrentUser};
use crate::services::restock::{CreateScheduleInput, ScheduleEntry, ScheduleOverview};
use crate::services::RestockService;
use crate::AppState;

pub async fn list_schedule(State(state): State<AppState>) -> AppResult<Json<Vec<ScheduleEntry>>> {
    let entries = RestockService::new(state.db).list().await?;
    Ok(Json(entries))
}

/// Upcoming, overdue and completed groups with counts
pub async fn schedule_overview(
    State(state): State<AppState>,
) -> AppResult<Json<ScheduleOverview>> {
    let overview = RestockService::new(state.db).overview().await?;
    Ok(Json(overview))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Json(input): Json<CreateScheduleInput>,
) -> AppResult<(StatusCode, Json<ScheduleEntry>)> {
    let entry = RestockService::new(state.db)
        .create(&current_user.0.to_actor(), input, &client)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Mark an entry completed
pub async fn complete_schedule(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ScheduleEntry>> {
    let entry = RestockService::new(state.db)
        .complete(&current_user.0.to_actor(), id, &client)
        .await?;
    Ok(Json(entry))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    RestockService::new(state.db)
        .delete(&current_user.0.to_actor(), id, &client)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
