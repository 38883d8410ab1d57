//! HTTP handlers for the stock ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{ClientInfo, CurrentUser};
use crate::services::stock::{
    InitializeStockInput, MovementEntry, MovementInput, MovementResult, StockDetail,
    StockOverview, StockView, UpdateStockInput,
};
use crate::services::StockService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub stock_id: Option<Uuid>,
}

/// Every stock row with recent movements, plus unstocked ingredients
pub async fn stock_overview(State(state): State<AppState>) -> AppResult<Json<StockOverview>> {
    let overview = StockService::new(state.db, &state.config).overview().await?;
    Ok(Json(overview))
}

pub async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StockDetail>> {
    let detail = StockService::new(state.db, &state.config).get(id).await?;
    Ok(Json(detail))
}

/// Rows at low or critical level
pub async fn stock_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<StockView>>> {
    let alerts = StockService::new(state.db, &state.config).alerts().await?;
    Ok(Json(alerts))
}

pub async fn initialize_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Json(input): Json<InitializeStockInput>,
) -> AppResult<(StatusCode, Json<StockView>)> {
    let service = StockService::new(state.db, &state.config);
    let stock = service
        .initialize(&current_user.0.to_actor(), input, &client)
        .await?;
    Ok((StatusCode::CREATED, Json(stock)))
}

pub async fn update_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<StockView>> {
    let service = StockService::new(state.db, &state.config);
    let stock = service
        .update(&current_user.0.to_actor(), id, input, &client)
        .await?;
    Ok(Json(stock))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    StockService::new(state.db, &state.config)
        .delete(&current_user.0.to_actor(), id, &client)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<MovementEntry>>> {
    let movements = StockService::new(state.db, &state.config)
        .list_movements(query.stock_id)
        .await?;
    Ok(Json(movements))
}

/// Record a restock, usage, waste or adjustment
pub async fn apply_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Json(input): Json<MovementInput>,
) -> AppResult<(StatusCode, Json<MovementResult>)> {
    let service = StockService::new(state.db, &state.config);
    let result = service
        .apply_movement(&current_user.0.to_actor(), input, &client)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}
