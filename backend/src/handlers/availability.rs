//! HTTP handlers for bar availability

use axum::{extract::State, Json};
use shared::{AvailabilityUpdate, BatchAvailabilityUpdate};

use crate::error::AppResult;
use crate::middleware::{ClientInfo, CurrentUser};
use crate::services::availability::{AvailabilityAck, AvailabilityEntry};
use crate::services::AvailabilityService;
use crate::AppState;

pub async fn list_availability(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AvailabilityEntry>>> {
    let entries = AvailabilityService::new(state.db).list().await?;
    Ok(Json(entries))
}

/// Set several flags at once; any authenticated user
pub async fn set_availability(
    State(state): State<AppState>,
    Json(updates): Json<Vec<AvailabilityUpdate>>,
) -> AppResult<Json<AvailabilityAck>> {
    let ack = AvailabilityService::new(state.db).set_many(&updates).await?;
    Ok(Json(ack))
}

/// Apply one flag to a list of ingredients (admin)
pub async fn batch_availability(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Json(batch): Json<BatchAvailabilityUpdate>,
) -> AppResult<Json<AvailabilityAck>> {
    let ack = AvailabilityService::new(state.db)
        .set_batch(&current_user.0.to_actor(), batch, &client)
        .await?;
    Ok(Json(ack))
}
