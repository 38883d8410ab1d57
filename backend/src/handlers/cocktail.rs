//! HTTP handlers for cocktails, doability and costing

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{generate_description, CocktailInput, DescriptionDraft};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{ClientInfo, CurrentUser};
use crate::services::cocktail::{
    CocktailCost, CocktailCostReport, CocktailFilter, CocktailWithDoability,
};
use crate::services::CocktailService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CostReportQuery {
    pub margin: Option<Decimal>,
}

/// List cocktails with doability, filtered by search, base spirit, mode and
/// free-text ingredients
pub async fn list_cocktails(
    State(state): State<AppState>,
    Query(filter): Query<CocktailFilter>,
) -> AppResult<Json<Vec<CocktailWithDoability>>> {
    let cocktails = CocktailService::new(state.db).list(filter).await?;
    Ok(Json(cocktails))
}

pub async fn get_cocktail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CocktailWithDoability>> {
    let cocktail = CocktailService::new(state.db).get(id).await?;
    Ok(Json(cocktail))
}

pub async fn get_cocktail_cost(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CocktailCost>> {
    let cost = CocktailService::new(state.db).cost(id).await?;
    Ok(Json(cost))
}

/// Record a view of the cocktail page
pub async fn record_cocktail_view(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    CocktailService::new(state.db)
        .record_view(id, Some(current_user.0.user_id), &client)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Cost and suggested price of every cocktail
pub async fn cost_report(
    State(state): State<AppState>,
    Query(query): Query<CostReportQuery>,
) -> AppResult<Json<Vec<CocktailCostReport>>> {
    let margin = query.margin.unwrap_or(state.config.pricing.margin_factor);
    let report = CocktailService::new(state.db).cost_report(margin).await?;
    Ok(Json(report))
}

pub async fn create_cocktail(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Json(input): Json<CocktailInput>,
) -> AppResult<(StatusCode, Json<CocktailWithDoability>)> {
    let service = CocktailService::new(state.db);
    let cocktail = service
        .create(&current_user.0.to_actor(), input, &client)
        .await?;
    Ok((StatusCode::CREATED, Json(cocktail)))
}

pub async fn update_cocktail(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(input): Json<CocktailInput>,
) -> AppResult<Json<CocktailWithDoability>> {
    let service = CocktailService::new(state.db);
    let cocktail = service
        .update(&current_user.0.to_actor(), id, input, &client)
        .await?;
    Ok(Json(cocktail))
}

#[derive(Debug, Serialize)]
pub struct GeneratedDescription {
    pub description: String,
}

/// Draft a French menu description from the cocktail form
pub async fn generate_cocktail_description(
    Json(draft): Json<DescriptionDraft>,
) -> AppResult<Json<GeneratedDescription>> {
    if draft.name.trim().is_empty() {
        return Err(AppError::validation(
            "name",
            "Cocktail name is required",
            "Nom du cocktail requis",
        ));
    }
    Ok(Json(GeneratedDescription {
        description: generate_description(&draft),
    }))
}

pub async fn delete_cocktail(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    CocktailService::new(state.db)
        .delete(&current_user.0.to_actor(), id, &client)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::CocktailType;

    #[test]
    fn test_description_needs_a_name() {
        let draft = DescriptionDraft {
            name: "   ".to_string(),
            ..Default::default()
        };
        let result = tokio_test::block_on(generate_cocktail_description(Json(draft)));
        assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "name"));
    }

    #[test]
    fn test_description_is_generated() {
        let draft = DescriptionDraft {
            name: "Espresso Martini".to_string(),
            cocktail_type: Some(CocktailType::ShortDrink),
            base_spirit: Some("Vodka".to_string()),
            ..Default::default()
        };
        let Json(generated) =
            tokio_test::block_on(generate_cocktail_description(Json(draft))).unwrap();
        assert!(generated
            .description
            .starts_with("Le Espresso Martini est un cocktail court et concentré à base de Vodka."));
    }
}
