//! User administration handlers

use axum::{extract::State, Json};
use shared::User;

use crate::error::AppResult;
use crate::middleware::{ClientInfo, CurrentUser};
use crate::services::user::UpdateRoleInput;
use crate::services::UserService;
use crate::AppState;

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = UserService::new(state.db).list().await?;
    Ok(Json(users))
}

/// Change a user's role
pub async fn update_user_role(
    State(state): State<AppState>,
    current_user: CurrentUser,
    client: ClientInfo,
    Json(input): Json<UpdateRoleInput>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    let user = service
        .update_role(&current_user.0.to_actor(), input, &client)
        .await?;
    Ok(Json(user))
}
