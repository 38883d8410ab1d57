//! Bar availability service
//!
//! A plain boolean per ingredient, toggled by staff. It is never derived from
//! stock quantity.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    collapse_updates, Actor, AuditAction, AvailabilityUpdate, BatchAvailabilityUpdate,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::ClientInfo;
use crate::services::audit::{AuditEntry, AuditService};

/// Availability row joined with the ingredient name
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub category: String,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}

/// Acknowledgement of an availability write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityAck {
    pub success: bool,
    pub updated: usize,
}

/// Bar availability service
#[derive(Clone)]
pub struct AvailabilityService {
    db: PgPool,
    audit: AuditService,
}

impl AvailabilityService {
    pub fn new(db: PgPool) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<AvailabilityEntry>> {
        let rows = sqlx::query_as::<_, AvailabilityEntry>(
            r#"
            SELECT ba.ingredient_id, i.name AS ingredient_name, i.category,
                   ba.available, ba.updated_at
            FROM bar_availability ba
            JOIN ingredients i ON i.id = ba.ingredient_id
            ORDER BY i.category, i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Upsert a list of flags in one transaction
    ///
    /// Any unknown ingredient id rejects the whole list.
    pub async fn set_many(&self, updates: &[AvailabilityUpdate]) -> AppResult<AvailabilityAck> {
        let updates = collapse_updates(updates);
        if updates.is_empty() {
            return Ok(AvailabilityAck {
                success: true,
                updated: 0,
            });
        }

        let ids: Vec<Uuid> = updates.iter().map(|u| u.ingredient_id).collect();
        let mut tx = self.db.begin().await?;

        let known: HashSet<Uuid> =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM ingredients WHERE id = ANY($1)")
                .bind(&ids)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
            tracing::warn!(ingredient_id = %missing, "Availability update for unknown ingredient");
            return Err(AppError::NotFound(format!("Ingredient {}", missing)));
        }

        for update in &updates {
            sqlx::query(
                r#"
                INSERT INTO bar_availability (ingredient_id, available, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (ingredient_id)
                DO UPDATE SET available = EXCLUDED.available, updated_at = NOW()
                "#,
            )
            .bind(update.ingredient_id)
            .bind(update.available)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(count = updates.len(), "Bar availability updated");

        Ok(AvailabilityAck {
            success: true,
            updated: updates.len(),
        })
    }

    /// Apply one flag to many ingredients, audited
    pub async fn set_batch(
        &self,
        actor: &Actor,
        batch: BatchAvailabilityUpdate,
        client: &ClientInfo,
    ) -> AppResult<AvailabilityAck> {
        if batch.ingredient_ids.is_empty() {
            return Err(AppError::validation(
                "ingredientIds",
                "At least one ingredient id is required",
                "Au moins un identifiant d'ingrédient est requis",
            ));
        }

        let available = batch.available;
        let ack = self.set_many(&batch.into_updates()).await?;

        let state = if available { "available" } else { "unavailable" };
        self.audit
            .record(
                client,
                AuditEntry {
                    entity_type: Some("bar_availability"),
                    ..AuditEntry::new(AuditAction::BarAvailabilityUpdated).by(actor)
                }
                .details(format!("Batch update: {} ingredients => {}", ack.updated, state)),
            )
            .await;

        Ok(ack)
    }
}
