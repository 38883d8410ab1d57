//! User administration service

use serde::Deserialize;
use shared::{Actor, AuditAction, User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::ClientInfo;
use crate::services::audit::{AuditEntry, AuditService};

/// Input for changing a user's role
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleInput {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// User administration service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
    audit: AuditService,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
        }
    }

    /// List users, newest first
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, name, role, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    /// Change a user's role
    pub async fn update_role(
        &self,
        actor: &Actor,
        input: UpdateRoleInput,
        client: &ClientInfo,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET role = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, name, role, created_at
            "#,
        )
        .bind(input.role)
        .bind(input.user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        tracing::info!(user_id = %user.id, role = %user.role, "User role changed");
        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::UserUpdated)
                    .by(actor)
                    .entity("user", user.id, user.email.clone())
                    .details(format!("Role set to {}", user.role)),
            )
            .await;

        Ok(user)
    }
}
