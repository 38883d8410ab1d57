//! HTTP handlers for the ingredient catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Ingredient, IngredientInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{ClientInfo, CurrentUser};
use crate::services::ingredient::{IngredientUsage, IngredientWithAvailability};
use crate::services::IngredientService;
use crate::AppState;

/// Ingredients with their bar availability
pub async fn list_ingredients(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<IngredientWithAvailability>>> {
    let ingredients = IngredientService::new(state.db)
        .list_with_availability()
        .await?;
    Ok(Json(ingredients))
}

/// Ingredients with usage counts (admin)
pub async fn list_ingredient_usage(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<IngredientUsage>>> {
    let ingredients = IngredientService::new(state.db).list_with_usage().await?;
    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Ingredient>> {
    let ingredient = IngredientService::new(state.db).get(id).await?;
    Ok(Json(ingredient))
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Json(input): Json<IngredientInput>,
) -> AppResult<(StatusCode, Json<Ingredient>)> {
    let service = IngredientService::new(state.db);
    let ingredient = service
        .create(&current_user.0.to_actor(), input, &client)
        .await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub async fn update_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(input): Json<IngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    let ingredient = service
        .update(&current_user.0.to_actor(), id, input, &client)
        .await?;
    Ok(Json(ingredient))
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    IngredientService::new(state.db)
        .delete(&current_user.0.to_actor(), id, &client)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
