//! Route definitions for the bar management API

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .route("/auth/login", post(handlers::login))
        // Any authenticated user
        .merge(staff_routes(state.clone()))
        // Administrators only
        .nest("/admin", admin_routes(state))
}

/// Routes open to every signed-in user
fn staff_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/change-password", post(handlers::change_password))
        .route("/ingredients", get(handlers::list_ingredients))
        .route("/ingredients/:id", get(handlers::get_ingredient))
        .route("/cocktails", get(handlers::list_cocktails))
        .route("/cocktails/:id", get(handlers::get_cocktail))
        .route("/cocktails/:id/cost", get(handlers::get_cocktail_cost))
        .route("/cocktails/:id/view", post(handlers::record_cocktail_view))
        .route(
            "/bar-availability",
            get(handlers::list_availability).put(handlers::set_availability),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Admin routes; `require_admin` runs after `auth_middleware`
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::list_users).put(handlers::update_user_role),
        )
        .route(
            "/ingredients",
            get(handlers::list_ingredient_usage).post(handlers::create_ingredient),
        )
        .route(
            "/ingredients/:id",
            put(handlers::update_ingredient).delete(handlers::delete_ingredient),
        )
        .route("/cocktails", post(handlers::create_cocktail))
        .route(
            "/cocktails/generate-description",
            post(handlers::generate_cocktail_description),
        )
        .route(
            "/cocktails/:id",
            put(handlers::update_cocktail).delete(handlers::delete_cocktail),
        )
        .route("/costs", get(handlers::cost_report))
        .route(
            "/stock",
            get(handlers::stock_overview).post(handlers::initialize_stock),
        )
        .route("/stock/alerts", get(handlers::stock_alerts))
        .route(
            "/stock/movements",
            get(handlers::list_movements).post(handlers::apply_movement),
        )
        .route(
            "/stock/:id",
            get(handlers::get_stock)
                .patch(handlers::update_stock)
                .delete(handlers::delete_stock),
        )
        .route("/batch/bar-availability", patch(handlers::batch_availability))
        .route(
            "/restock-schedule",
            get(handlers::list_schedule).post(handlers::create_schedule),
        )
        .route("/restock-schedule/overview", get(handlers::schedule_overview))
        .route(
            "/restock-schedule/:id",
            patch(handlers::complete_schedule).delete(handlers::delete_schedule),
        )
        .route("/audit-logs", get(handlers::list_audit_logs))
        .route("/stats", get(handlers::dashboard_stats))
        .route("/export/ingredients", get(handlers::export_ingredients))
        .route("/export/cocktails", get(handlers::export_cocktails))
        .route(
            "/settings",
            get(handlers::get_settings).patch(handlers::update_settings),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
