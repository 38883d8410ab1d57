//! Restock schedule service
//!
//! Status is computed at read time against the current clock. Completing an
//! entry does not touch the stock ledger; the actual delivery is recorded
//! separately as a restock movement.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    partition_schedules, validate_planned_quantity, validate_unit, Actor, AuditAction,
    RestockPartition, RestockSchedule, RestockStatus, DEFAULT_UNIT,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::ClientInfo;
use crate::services::audit::{AuditEntry, AuditService};

#[derive(Debug, Clone, FromRow)]
struct ScheduleRow {
    #[sqlx(flatten)]
    schedule: RestockSchedule,
    ingredient_name: String,
    created_at: DateTime<Utc>,
}

/// Schedule entry with ingredient name and status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[serde(flatten)]
    pub schedule: RestockSchedule,
    pub ingredient_name: String,
    pub status: RestockStatus,
    pub created_at: DateTime<Utc>,
}

impl ScheduleEntry {
    fn from_row(row: ScheduleRow, now: DateTime<Utc>) -> Self {
        Self {
            status: row.schedule.status_at(now),
            schedule: row.schedule,
            ingredient_name: row.ingredient_name,
            created_at: row.created_at,
        }
    }
}

/// Grouped schedule with bucket sizes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOverview {
    #[serde(flatten)]
    pub partition: RestockPartition<ScheduleEntry>,
    pub counts: ScheduleCounts,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScheduleCounts {
    pub upcoming: usize,
    pub overdue: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleInput {
    pub ingredient_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

const SELECT_SCHEDULES: &str = r#"
    SELECT r.id, r.ingredient_id, r.scheduled_date, r.quantity, r.unit, r.notes,
           r.completed, r.completed_at, r.created_at, i.name AS ingredient_name
    FROM restock_schedules r
    JOIN ingredients i ON i.id = r.ingredient_id
"#;

/// Restock schedule service
#[derive(Clone)]
pub struct RestockService {
    db: PgPool,
    audit: AuditService,
}

impl RestockService {
    pub fn new(db: PgPool) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
        }
    }

    /// Pending entries first, then by scheduled date
    pub async fn list(&self) -> AppResult<Vec<ScheduleEntry>> {
        let now = Utc::now();
        let rows = sqlx::query_as::<_, ScheduleRow>(&format!(
            "{} ORDER BY r.completed ASC, r.scheduled_date ASC",
            SELECT_SCHEDULES
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScheduleEntry::from_row(row, now))
            .collect())
    }

    pub async fn overview(&self) -> AppResult<ScheduleOverview> {
        let entries = self.list().await?;
        let partition = partition_schedules(entries, Utc::now(), |e, now| e.schedule.status_at(now));
        let (upcoming, overdue, completed) = partition.counts();

        Ok(ScheduleOverview {
            partition,
            counts: ScheduleCounts {
                upcoming,
                overdue,
                completed,
            },
        })
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateScheduleInput,
        client: &ClientInfo,
    ) -> AppResult<ScheduleEntry> {
        validate_planned_quantity(input.quantity)?;
        let unit = input.unit.as_deref().unwrap_or(DEFAULT_UNIT);
        validate_unit(unit)?;

        let ingredient_name =
            sqlx::query_scalar::<_, String>("SELECT name FROM ingredients WHERE id = $1")
                .bind(input.ingredient_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO restock_schedules (ingredient_id, scheduled_date, quantity, unit, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.ingredient_id)
        .bind(input.scheduled_date)
        .bind(input.quantity)
        .bind(unit.trim())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::RestockScheduled)
                    .by(actor)
                    .entity("restock_schedule", id, ingredient_name.clone())
                    .details(format!(
                        "{} {} on {}",
                        input.quantity,
                        unit.trim(),
                        input.scheduled_date.format("%Y-%m-%d")
                    )),
            )
            .await;

        self.get(id).await
    }

    /// Mark an entry completed
    ///
    /// Completing twice keeps the first `completedAt`.
    pub async fn complete(
        &self,
        actor: &Actor,
        id: Uuid,
        client: &ClientInfo,
    ) -> AppResult<ScheduleEntry> {
        let mut tx = self.db.begin().await?;

        let mut schedule = sqlx::query_as::<_, RestockSchedule>(
            r#"
            SELECT id, ingredient_id, scheduled_date, quantity, unit, notes, completed,
                   completed_at
            FROM restock_schedules
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Restock schedule".to_string()))?;

        let newly_completed = schedule.complete(Utc::now());
        if newly_completed {
            sqlx::query(
                "UPDATE restock_schedules SET completed = $1, completed_at = $2 WHERE id = $3",
            )
            .bind(schedule.completed)
            .bind(schedule.completed_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let entry = self.get(id).await?;

        if newly_completed {
            self.audit
                .record(
                    client,
                    AuditEntry::new(AuditAction::RestockCompleted)
                        .by(actor)
                        .entity("restock_schedule", id, entry.ingredient_name.clone()),
                )
                .await;
        }

        Ok(entry)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid, client: &ClientInfo) -> AppResult<()> {
        let entry = self.get(id).await?;

        sqlx::query("DELETE FROM restock_schedules WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::RestockDeleted)
                    .by(actor)
                    .entity("restock_schedule", id, entry.ingredient_name),
            )
            .await;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<ScheduleEntry> {
        let row = sqlx::query_as::<_, ScheduleRow>(&format!("{} WHERE r.id = $1", SELECT_SCHEDULES))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Restock schedule".to_string()))?;

        Ok(ScheduleEntry::from_row(row, Utc::now()))
    }
}
