//! Admin reporting handlers: audit trail, dashboard, exports and settings

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::{AuditLog, Language, PaginatedResponse};

use crate::error::AppResult;
use crate::middleware::{ClientInfo, CurrentUser};
use crate::services::audit::AuditQuery;
use crate::services::export::CsvExport;
use crate::services::settings::{SystemSettings, UpdateSettingsInput};
use crate::services::stats::DashboardStats;
use crate::services::{AuditService, ExportService, SettingsService, StatsService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub lang: Language,
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<PaginatedResponse<AuditLog>>> {
    let logs = AuditService::new(state.db).list(query).await?;
    Ok(Json(logs))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = StatsService::new(state.db, &state.config).dashboard().await?;
    Ok(Json(stats))
}

fn csv_attachment(export: CsvExport) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    )
}

pub async fn export_ingredients(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<impl IntoResponse> {
    let export = ExportService::new(state.db).ingredients(query.lang).await?;
    Ok(csv_attachment(export))
}

pub async fn export_cocktails(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<impl IntoResponse> {
    let export = ExportService::new(state.db).cocktails(query.lang).await?;
    Ok(csv_attachment(export))
}

pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<SystemSettings>> {
    let settings = SettingsService::new(state.db).get().await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Json(input): Json<UpdateSettingsInput>,
) -> AppResult<Json<SystemSettings>> {
    let settings = SettingsService::new(state.db)
        .update(&current_user.0.to_actor(), input, &client)
        .await?;
    Ok(Json(settings))
}
