//! System settings
//!
//! A single row, created with defaults the first time it is read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Actor, AuditAction};
use sqlx::{FromRow, PgPool};

use crate::error::AppResult;
use crate::middleware::ClientInfo;
use crate::services::audit::{AuditEntry, AuditService};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub maintenance_mode: bool,
    pub maintenance_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsInput {
    pub maintenance_mode: Option<bool>,
    pub maintenance_message: Option<String>,
}

impl UpdateSettingsInput {
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(mode) = self.maintenance_mode {
            parts.push(format!("maintenanceMode={}", mode));
        }
        if self.maintenance_message.is_some() {
            parts.push("maintenanceMessage".to_string());
        }
        parts.join(", ")
    }
}

pub struct SettingsService {
    db: PgPool,
    audit: AuditService,
}

impl SettingsService {
    pub fn new(db: PgPool) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
        }
    }

    pub async fn get(&self) -> AppResult<SystemSettings> {
        sqlx::query("INSERT INTO system_settings (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(&self.db)
            .await?;

        let settings = sqlx::query_as::<_, SystemSettings>(
            "SELECT maintenance_mode, maintenance_message, updated_at FROM system_settings WHERE id = 1",
        )
        .fetch_one(&self.db)
        .await?;
        Ok(settings)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        input: UpdateSettingsInput,
        client: &ClientInfo,
    ) -> AppResult<SystemSettings> {
        let settings = sqlx::query_as::<_, SystemSettings>(
            r#"
            INSERT INTO system_settings (id, maintenance_mode, maintenance_message)
            VALUES (1, COALESCE($1, FALSE), $2)
            ON CONFLICT (id) DO UPDATE
            SET maintenance_mode = COALESCE($1, system_settings.maintenance_mode),
                maintenance_message = COALESCE($2, system_settings.maintenance_message),
                updated_at = NOW()
            RETURNING maintenance_mode, maintenance_message, updated_at
            "#,
        )
        .bind(input.maintenance_mode)
        .bind(&input.maintenance_message)
        .fetch_one(&self.db)
        .await?;

        if settings.maintenance_mode {
            tracing::warn!("Maintenance mode is on");
        }

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::SettingsUpdated)
                    .by(actor)
                    .details(input.describe()),
            )
            .await;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_description() {
        let input: UpdateSettingsInput =
            serde_json::from_str(r#"{"maintenanceMode": true}"#).unwrap();
        assert_eq!(input.maintenance_message, None);
        assert_eq!(input.describe(), "maintenanceMode=true");
    }
}
