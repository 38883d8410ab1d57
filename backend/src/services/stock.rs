//! Stock ledger service
//!
//! Balances change only through movements. `apply_movement` locks the stock
//! row (`SELECT ... FOR UPDATE`) for the whole check-and-write, so concurrent
//! withdrawals against the same row serialize and the underflow check always
//! sees the current balance. The movement insert and the balance update
//! commit together or not at all.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use shared::{
    apply_movement, validate_initial_quantity, validate_stock_thresholds, validate_unit, Actor,
    AuditAction, LedgerError, MovementRequest, MovementType, Quantity, Stock, StockMovement,
    StockStatus, DEFAULT_UNIT, INITIAL_STOCK_REASON,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::ClientInfo;
use crate::services::audit::{AuditEntry, AuditService};

/// Movements shown per row on the overview
const RECENT_MOVEMENTS: i64 = 5;
/// Cap on the movement journal listing
const MOVEMENT_LIST_LIMIT: i64 = 100;

/// Stock row joined with its ingredient
#[derive(Debug, Clone, FromRow)]
struct StockRow {
    #[sqlx(flatten)]
    stock: Stock,
    ingredient_name: String,
    category: String,
}

/// Stock row with derived status, as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockView {
    #[serde(flatten)]
    pub stock: Stock,
    pub ingredient_name: String,
    pub category: String,
    pub status: StockStatus,
    pub fill_percent: Option<Decimal>,
}

impl From<StockRow> for StockView {
    fn from(row: StockRow) -> Self {
        Self {
            status: row.stock.status(),
            fill_percent: row.stock.fill_percent(),
            stock: row.stock,
            ingredient_name: row.ingredient_name,
            category: row.category,
        }
    }
}

/// Stock row with a slice of its movement history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetail {
    #[serde(flatten)]
    pub view: StockView,
    pub movements: Vec<StockMovement>,
}

/// Ingredient that has no stock row yet
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UnstockedIngredient {
    pub id: Uuid,
    pub name: String,
    pub category: String,
}

/// Stock administration overview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockOverview {
    pub stocks: Vec<StockDetail>,
    pub ingredients_without_stock: Vec<UnstockedIngredient>,
}

/// Movement journal entry
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MovementEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub movement: StockMovement,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub user_name: Option<String>,
}

/// Input for creating a stock row
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeStockInput {
    pub ingredient_id: Uuid,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub min_threshold: Option<Decimal>,
    pub max_threshold: Option<Decimal>,
}

/// Partial update; an explicit `null` clears a threshold
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockInput {
    #[serde(default, deserialize_with = "explicit_null")]
    pub min_threshold: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub max_threshold: Option<Option<Decimal>>,
    pub unit: Option<String>,
}

/// Distinguish an absent field (`None`) from an explicit null (`Some(None)`)
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Input for a stock movement
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementInput {
    pub stock_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub reason: Option<String>,
}

/// Recorded movement with the stock row it changed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResult {
    pub movement: StockMovement,
    pub stock: StockView,
}

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    audit: AuditService,
    strict_units: bool,
}

impl StockService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self::with_strict_units(db, config.ledger.strict_units)
    }

    fn with_strict_units(db: PgPool, strict_units: bool) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
            strict_units,
        }
    }

    /// Every stock row with status and its latest movements
    pub async fn overview(&self) -> AppResult<StockOverview> {
        let rows = self.fetch_rows().await?;

        let recent = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, stock_id, movement_type, quantity, unit, reason, user_id, created_at
            FROM (
                SELECT m.*, ROW_NUMBER() OVER (
                    PARTITION BY m.stock_id ORDER BY m.created_at DESC
                ) AS rn
                FROM stock_movements m
            ) ranked
            WHERE rn <= $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(RECENT_MOVEMENTS)
        .fetch_all(&self.db)
        .await?;

        let stocks = rows
            .into_iter()
            .map(|row| {
                let movements = recent
                    .iter()
                    .filter(|m| m.stock_id == row.stock.id)
                    .cloned()
                    .collect();
                StockDetail {
                    view: row.into(),
                    movements,
                }
            })
            .collect();

        let ingredients_without_stock = sqlx::query_as::<_, UnstockedIngredient>(
            r#"
            SELECT i.id, i.name, i.category
            FROM ingredients i
            WHERE NOT EXISTS (SELECT 1 FROM stock s WHERE s.ingredient_id = i.id)
            ORDER BY i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(StockOverview {
            stocks,
            ingredients_without_stock,
        })
    }

    /// One stock row with its full history, newest first
    pub async fn get(&self, id: Uuid) -> AppResult<StockDetail> {
        let row = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT s.id, s.ingredient_id, s.quantity, s.unit, s.min_threshold,
                   s.max_threshold, s.last_restock_date,
                   i.name AS ingredient_name, i.category
            FROM stock s
            JOIN ingredients i ON i.id = s.ingredient_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, stock_id, movement_type, quantity, unit, reason, user_id, created_at
            FROM stock_movements
            WHERE stock_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(StockDetail {
            view: row.into(),
            movements,
        })
    }

    /// Rows whose status is low or critical, critical first
    pub async fn alerts(&self) -> AppResult<Vec<StockView>> {
        let mut alerts: Vec<StockView> = self
            .fetch_rows()
            .await?
            .into_iter()
            .map(StockView::from)
            .filter(|v| v.status.needs_attention())
            .collect();
        alerts.sort_by_key(|v| match v.status {
            StockStatus::Critical => 0,
            StockStatus::Low => 1,
            StockStatus::Normal => 2,
        });
        Ok(alerts)
    }

    /// Create the stock row for an ingredient
    ///
    /// A positive starting quantity is recorded as a synthetic restock so the
    /// balance can always be rebuilt from the ledger.
    pub async fn initialize(
        &self,
        actor: &Actor,
        input: InitializeStockInput,
        client: &ClientInfo,
    ) -> AppResult<StockView> {
        let quantity = input.quantity.unwrap_or(Decimal::ZERO);
        let unit = input
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_UNIT)
            .to_string();
        validate_initial_quantity(quantity)?;
        validate_stock_thresholds(input.min_threshold, input.max_threshold)?;

        let mut tx = self.db.begin().await?;

        let ingredient_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM ingredients WHERE id = $1",
        )
        .bind(input.ingredient_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock WHERE ingredient_id = $1)",
        )
        .bind(input.ingredient_id)
        .fetch_one(&mut *tx)
        .await?;
        if exists {
            return Err(AppError::conflict(
                "stock",
                "This ingredient already has a stock row",
                "Cet ingrédient possède déjà un stock",
            ));
        }

        let stock = sqlx::query_as::<_, Stock>(
            r#"
            INSERT INTO stock (
                ingredient_id, quantity, unit, min_threshold, max_threshold, last_restock_date
            )
            VALUES ($1, $2, $3, $4, $5, CASE WHEN $2 > 0 THEN NOW() ELSE NULL END)
            RETURNING id, ingredient_id, quantity, unit, min_threshold, max_threshold,
                      last_restock_date
            "#,
        )
        .bind(input.ingredient_id)
        .bind(quantity)
        .bind(&unit)
        .bind(input.min_threshold)
        .bind(input.max_threshold)
        .fetch_one(&mut *tx)
        .await?;

        if quantity > Decimal::ZERO {
            Self::insert_movement(
                &mut tx,
                stock.id,
                MovementType::Restock,
                quantity,
                &unit,
                Some(INITIAL_STOCK_REASON),
                actor.user_id,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            stock_id = %stock.id,
            quantity = %Quantity::new(quantity, unit.clone()),
            "Stock initialized"
        );
        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::StockCreated)
                    .by(actor)
                    .entity("stock", stock.id, ingredient_name.clone())
                    .details(format!("Initial quantity {} {}", quantity, unit)),
            )
            .await;

        let category = self.category_of(stock.ingredient_id).await?;
        Ok(StockView::from(StockRow {
            stock,
            ingredient_name,
            category,
        }))
    }

    /// Update thresholds and/or unit; the quantity is never touched here
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateStockInput,
        client: &ClientInfo,
    ) -> AppResult<StockView> {
        if let Some(unit) = &input.unit {
            validate_unit(unit)?;
        }

        let mut tx = self.db.begin().await?;
        let current = Self::lock_row(&mut tx, id).await?;

        let min_threshold = input
            .min_threshold
            .unwrap_or(current.stock.min_threshold);
        let max_threshold = input
            .max_threshold
            .unwrap_or(current.stock.max_threshold);
        validate_stock_thresholds(min_threshold, max_threshold)?;
        let unit = input
            .unit
            .as_deref()
            .map(str::trim)
            .unwrap_or(current.stock.unit.as_str())
            .to_string();

        let stock = sqlx::query_as::<_, Stock>(
            r#"
            UPDATE stock
            SET min_threshold = $1, max_threshold = $2, unit = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, ingredient_id, quantity, unit, min_threshold, max_threshold,
                      last_restock_date
            "#,
        )
        .bind(min_threshold)
        .bind(max_threshold)
        .bind(&unit)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::StockUpdated)
                    .by(actor)
                    .entity("stock", id, current.ingredient_name.clone()),
            )
            .await;

        Ok(StockView::from(StockRow {
            stock,
            ingredient_name: current.ingredient_name,
            category: current.category,
        }))
    }

    /// Remove a stock row together with its movements
    pub async fn delete(&self, actor: &Actor, id: Uuid, client: &ClientInfo) -> AppResult<()> {
        let ingredient_name = sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM stock s
            USING ingredients i
            WHERE s.id = $1 AND i.id = s.ingredient_id
            RETURNING i.name
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::StockDeleted)
                    .by(actor)
                    .entity("stock", id, ingredient_name),
            )
            .await;

        Ok(())
    }

    /// Latest movements, optionally for one stock row
    pub async fn list_movements(&self, stock_id: Option<Uuid>) -> AppResult<Vec<MovementEntry>> {
        let rows = sqlx::query_as::<_, MovementEntry>(
            r#"
            SELECT m.id, m.stock_id, m.movement_type, m.quantity, m.unit, m.reason,
                   m.user_id, m.created_at,
                   s.ingredient_id, i.name AS ingredient_name, u.name AS user_name
            FROM stock_movements m
            JOIN stock s ON s.id = m.stock_id
            JOIN ingredients i ON i.id = s.ingredient_id
            LEFT JOIN users u ON u.id = m.user_id
            WHERE ($1::uuid IS NULL OR m.stock_id = $1)
            ORDER BY m.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(stock_id)
        .bind(MOVEMENT_LIST_LIMIT)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Apply a typed movement to a stock row
    ///
    /// Rejected movements (underflow, unit mismatch, non-positive quantity)
    /// leave no trace: the transaction is dropped before any write.
    pub async fn apply_movement(
        &self,
        actor: &Actor,
        input: MovementInput,
        client: &ClientInfo,
    ) -> AppResult<MovementResult> {
        let movement_type: MovementType = input.movement_type.trim().parse()?;
        let request = MovementRequest {
            movement_type,
            quantity: input.quantity,
            unit: input.unit.clone(),
        };
        let reason = input
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());

        let mut tx = self.db.begin().await?;
        let current = Self::lock_row(&mut tx, input.stock_id).await?;

        let outcome = apply_movement(
            current.stock.quantity,
            &current.stock.unit,
            &request,
            self.strict_units,
        )
        .map_err(|e| {
            if let LedgerError::InsufficientStock { .. } = &e {
                tracing::warn!(stock_id = %input.stock_id, "Withdrawal rejected: {}", e);
            }
            AppError::from(e)
        })?;

        let movement = Self::insert_movement(
            &mut tx,
            input.stock_id,
            movement_type,
            input.quantity,
            &outcome.unit,
            reason,
            actor.user_id,
        )
        .await?;

        let stock = sqlx::query_as::<_, Stock>(
            r#"
            UPDATE stock
            SET quantity = $1,
                last_restock_date = CASE WHEN $2 THEN NOW() ELSE last_restock_date END,
                updated_at = NOW()
            WHERE id = $3
            RETURNING id, ingredient_id, quantity, unit, min_threshold, max_threshold,
                      last_restock_date
            "#,
        )
        .bind(outcome.new_quantity)
        .bind(outcome.stamps_restock_date)
        .bind(input.stock_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            stock_id = %stock.id,
            movement = %movement_type,
            from = %outcome.previous_quantity,
            to = %Quantity::new(outcome.new_quantity, stock.unit.clone()),
            "Stock movement applied"
        );
        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::StockMovement)
                    .by(actor)
                    .entity("stock", stock.id, current.ingredient_name.clone())
                    .details(format!(
                        "{} {} {} ({} -> {})",
                        movement_type,
                        input.quantity,
                        outcome.unit,
                        outcome.previous_quantity,
                        outcome.new_quantity
                    )),
            )
            .await;

        Ok(MovementResult {
            movement,
            stock: StockView::from(StockRow {
                stock,
                ingredient_name: current.ingredient_name,
                category: current.category,
            }),
        })
    }

    async fn fetch_rows(&self) -> AppResult<Vec<StockRow>> {
        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT s.id, s.ingredient_id, s.quantity, s.unit, s.min_threshold,
                   s.max_threshold, s.last_restock_date,
                   i.name AS ingredient_name, i.category
            FROM stock s
            JOIN ingredients i ON i.id = s.ingredient_id
            ORDER BY i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn category_of(&self, ingredient_id: Uuid) -> AppResult<String> {
        let category =
            sqlx::query_scalar::<_, String>("SELECT category FROM ingredients WHERE id = $1")
                .bind(ingredient_id)
                .fetch_one(&self.db)
                .await?;
        Ok(category)
    }

    /// Lock a stock row for the rest of the transaction
    async fn lock_row(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<StockRow> {
        sqlx::query_as::<_, StockRow>(
            r#"
            SELECT s.id, s.ingredient_id, s.quantity, s.unit, s.min_threshold,
                   s.max_threshold, s.last_restock_date,
                   i.name AS ingredient_name, i.category
            FROM stock s
            JOIN ingredients i ON i.id = s.ingredient_id
            WHERE s.id = $1
            FOR UPDATE OF s
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))
    }

    async fn insert_movement(
        tx: &mut Transaction<'_, Postgres>,
        stock_id: Uuid,
        movement_type: MovementType,
        quantity: Decimal,
        unit: &str,
        reason: Option<&str>,
        user_id: Uuid,
    ) -> AppResult<StockMovement> {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (stock_id, movement_type, quantity, unit, reason, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, stock_id, movement_type, quantity, unit, reason, user_id, created_at
            "#,
        )
        .bind(stock_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(unit)
        .bind(reason)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(movement)
    }
}
