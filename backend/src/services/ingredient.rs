//! Ingredient catalog service

use serde::Serialize;
use shared::{validate_ingredient, Actor, AuditAction, Ingredient, IngredientInput};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::ClientInfo;
use crate::services::audit::{AuditEntry, AuditService};

/// Ingredient with its bar availability flag
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IngredientWithAvailability {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub available: bool,
}

/// Ingredient with the number of cocktails using it
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IngredientUsage {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub cocktail_count: i64,
    pub has_stock: bool,
}

/// Ingredient catalog service
#[derive(Clone)]
pub struct IngredientService {
    db: PgPool,
    audit: AuditService,
}

impl IngredientService {
    pub fn new(db: PgPool) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
        }
    }

    /// All ingredients with availability, by name
    pub async fn list_with_availability(&self) -> AppResult<Vec<IngredientWithAvailability>> {
        let rows = sqlx::query_as::<_, IngredientWithAvailability>(
            r#"
            SELECT i.id, i.name, i.category, i.subcategory, i.is_alcoholic, i.base_spirit,
                   i.cost_per_unit, i.cost_unit, i.created_at, i.updated_at,
                   COALESCE(ba.available, FALSE) AS available
            FROM ingredients i
            LEFT JOIN bar_availability ba ON ba.ingredient_id = i.id
            ORDER BY i.category, i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// All ingredients with usage counts, by name
    pub async fn list_with_usage(&self) -> AppResult<Vec<IngredientUsage>> {
        let rows = sqlx::query_as::<_, IngredientUsage>(
            r#"
            SELECT i.id, i.name, i.category, i.subcategory, i.is_alcoholic, i.base_spirit,
                   i.cost_per_unit, i.cost_unit, i.created_at, i.updated_at,
                   (SELECT COUNT(*) FROM cocktail_ingredients ci WHERE ci.ingredient_id = i.id)
                       AS cocktail_count,
                   EXISTS(SELECT 1 FROM stock s WHERE s.ingredient_id = i.id) AS has_stock
            FROM ingredients i
            ORDER BY i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Ingredient> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, category, subcategory, is_alcoholic, base_spirit,
                   cost_per_unit, cost_unit, created_at, updated_at
            FROM ingredients WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))
    }

    /// Create an ingredient; it starts unavailable at the bar
    pub async fn create(
        &self,
        actor: &Actor,
        input: IngredientInput,
        client: &ClientInfo,
    ) -> AppResult<Ingredient> {
        input.validate()?;
        validate_ingredient(&input)?;

        let mut tx = self.db.begin().await?;

        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (
                name, category, subcategory, is_alcoholic, base_spirit, cost_per_unit, cost_unit
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, category, subcategory, is_alcoholic, base_spirit,
                      cost_per_unit, cost_unit, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(&input.subcategory)
        .bind(input.is_alcoholic)
        .bind(&input.base_spirit)
        .bind(input.cost_per_unit)
        .bind(&input.cost_unit)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO bar_availability (ingredient_id, available) VALUES ($1, FALSE)")
            .bind(ingredient.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::IngredientCreated)
                    .by(actor)
                    .entity("ingredient", ingredient.id, ingredient.name.clone()),
            )
            .await;

        Ok(ingredient)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: IngredientInput,
        client: &ClientInfo,
    ) -> AppResult<Ingredient> {
        input.validate()?;
        validate_ingredient(&input)?;

        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients
            SET name = $1, category = $2, subcategory = $3, is_alcoholic = $4,
                base_spirit = $5, cost_per_unit = $6, cost_unit = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING id, name, category, subcategory, is_alcoholic, base_spirit,
                      cost_per_unit, cost_unit, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(&input.subcategory)
        .bind(input.is_alcoholic)
        .bind(&input.base_spirit)
        .bind(input.cost_per_unit)
        .bind(&input.cost_unit)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::IngredientUpdated)
                    .by(actor)
                    .entity("ingredient", ingredient.id, ingredient.name.clone()),
            )
            .await;

        Ok(ingredient)
    }

    /// Delete an ingredient no cocktail or stock row refers to
    pub async fn delete(&self, actor: &Actor, id: Uuid, client: &ClientInfo) -> AppResult<()> {
        let ingredient = self.get(id).await?;

        let (cocktails, has_stock) = sqlx::query_as::<_, (i64, bool)>(
            r#"
            SELECT (SELECT COUNT(*) FROM cocktail_ingredients WHERE ingredient_id = $1),
                   EXISTS(SELECT 1 FROM stock WHERE ingredient_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if cocktails > 0 {
            return Err(AppError::conflict(
                "ingredient",
                "Ingredient is used by at least one cocktail",
                "L'ingrédient est utilisé par au moins un cocktail",
            ));
        }
        if has_stock {
            return Err(AppError::conflict(
                "ingredient",
                "Ingredient still has a stock row",
                "L'ingrédient possède encore un stock",
            ));
        }

        sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::IngredientDeleted)
                    .by(actor)
                    .entity("ingredient", id, ingredient.name),
            )
            .await;

        Ok(())
    }
}
