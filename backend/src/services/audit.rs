//! Audit trail service
//!
//! Writes are best-effort: a failed insert is logged and swallowed so the
//! operation being audited never fails or rolls back because of it.

use serde::Deserialize;
use shared::{Actor, AuditAction, AuditLog, PaginatedResponse, Pagination, PaginationMeta};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::ClientInfo;

/// One audit entry about to be written
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub entity_type: Option<&'static str>,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            user_id: None,
            user_email: None,
            user_name: None,
            entity_type: None,
            entity_id: None,
            entity_name: None,
            details: None,
        }
    }

    /// Stamp the acting user
    pub fn by(mut self, actor: &Actor) -> Self {
        self.user_id = Some(actor.user_id);
        self.user_email = Some(actor.email.clone());
        self.user_name = actor.name.clone();
        self
    }

    /// Stamp an unauthenticated attempt (failed logins)
    pub fn by_email(mut self, email: &str) -> Self {
        self.user_email = Some(email.to_string());
        self
    }

    pub fn entity(
        mut self,
        entity_type: &'static str,
        entity_id: impl ToString,
        entity_name: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = Some(entity_id.to_string());
        self.entity_name = Some(entity_name.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Filters for the audit log listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub action: Option<AuditAction>,
    pub entity_type: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Audit trail service
#[derive(Clone)]
pub struct AuditService {
    db: PgPool,
}

impl AuditService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append an entry; failures are logged, never returned
    pub async fn record(&self, client: &ClientInfo, entry: AuditEntry) {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (
                user_id, user_email, user_name, action, entity_type, entity_id,
                entity_name, details, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.user_email)
        .bind(&entry.user_name)
        .bind(entry.action)
        .bind(entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.entity_name)
        .bind(&entry.details)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            tracing::warn!(action = %entry.action, error = %e, "Failed to write audit log");
        }
    }

    /// List entries, newest first
    pub async fn list(&self, query: AuditQuery) -> AppResult<PaginatedResponse<AuditLog>> {
        let pagination = Pagination::normalized(query.page, query.limit);

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM audit_logs
            WHERE ($1::audit_action IS NULL OR action = $1)
              AND ($2::text IS NULL OR entity_type = $2)
            "#,
        )
        .bind(query.action)
        .bind(&query.entity_type)
        .fetch_one(&self.db)
        .await?;

        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, user_id, user_email, user_name, action, entity_type, entity_id,
                   entity_name, details, ip_address, user_agent, created_at
            FROM audit_logs
            WHERE ($1::audit_action IS NULL OR action = $1)
              AND ($2::text IS NULL OR entity_type = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.action)
        .bind(&query.entity_type)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: logs,
            pagination: PaginationMeta::new(&pagination, total.max(0) as u64),
        })
    }
}
