//! Cocktail catalog service
//!
//! Doability and cost are derived on every read from the recipe lines joined
//! with live bar availability and ingredient costs. Nothing derived is
//! cached between requests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    can_make_with, compute_cost, parse_ingredient_list, resolve, suggest_price, validate_cocktail,
    Actor, AuditAction, CocktailInput, CocktailType, CostBreakdown, Doability, DoabilityMode,
    FuzzySubstringMatcher, IngredientMatcher, PriceSuggestion, RecipeLine,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::ClientInfo;
use crate::services::audit::{AuditEntry, AuditService};

/// Escape `LIKE` wildcards so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Stored cocktail columns
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cocktail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub cocktail_type: CocktailType,
    pub base_spirit: Option<String>,
    pub glass: String,
    pub ice: bool,
    pub ice_type: Option<String>,
    pub method: String,
    pub garnish: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recipe line joined with catalog and availability data
#[derive(Debug, Clone, FromRow)]
struct RecipeRow {
    cocktail_id: Uuid,
    ingredient_id: Uuid,
    ingredient_name: String,
    quantity: Option<Decimal>,
    unit: Option<String>,
    is_optional: bool,
    cost_per_unit: Option<Decimal>,
    available: bool,
}

/// Recipe line as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineView {
    #[serde(flatten)]
    pub line: RecipeLine,
    pub available: bool,
}

impl From<RecipeRow> for RecipeLineView {
    fn from(row: RecipeRow) -> Self {
        Self {
            line: RecipeLine {
                ingredient_id: row.ingredient_id,
                ingredient_name: row.ingredient_name,
                quantity: row.quantity,
                unit: row.unit,
                is_optional: row.is_optional,
                cost_per_unit: row.cost_per_unit,
            },
            available: row.available,
        }
    }
}

/// Cocktail with its recipe and derived doability
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailWithDoability {
    #[serde(flatten)]
    pub cocktail: Cocktail,
    pub ingredients: Vec<RecipeLineView>,
    #[serde(flatten)]
    pub doability: Doability,
}

impl CocktailWithDoability {
    fn build(cocktail: Cocktail, ingredients: Vec<RecipeLineView>) -> Self {
        let lines: Vec<RecipeLine> = ingredients.iter().map(|v| v.line.clone()).collect();
        let available: HashSet<Uuid> = ingredients
            .iter()
            .filter(|v| v.available)
            .map(|v| v.line.ingredient_id)
            .collect();
        let doability = resolve(&lines, |id| available.contains(&id));
        Self {
            cocktail,
            ingredients,
            doability,
        }
    }

    fn lines(&self) -> Vec<RecipeLine> {
        self.ingredients.iter().map(|v| v.line.clone()).collect()
    }
}

/// List filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailFilter {
    pub search: Option<String>,
    pub base_spirit: Option<String>,
    #[serde(default)]
    pub mode: DoabilityMode,
    /// Comma-separated free-text ingredient names
    pub ingredients: Option<String>,
}

/// Cost of one cocktail
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailCost {
    pub cocktail_id: Uuid,
    pub cocktail_name: String,
    #[serde(flatten)]
    pub cost: CostBreakdown,
}

/// Cost with suggested price, one row per cocktail
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailCostReport {
    pub cocktail_id: Uuid,
    pub cocktail_name: String,
    #[serde(rename = "type")]
    pub cocktail_type: CocktailType,
    #[serde(flatten)]
    pub cost: CostBreakdown,
    #[serde(flatten)]
    pub pricing: PriceSuggestion,
}

/// Cocktail catalog service
#[derive(Clone)]
pub struct CocktailService {
    db: PgPool,
    audit: AuditService,
    matcher: Arc<dyn IngredientMatcher>,
}

impl CocktailService {
    pub fn new(db: PgPool) -> Self {
        Self::with_matcher(db, Arc::new(FuzzySubstringMatcher))
    }

    /// Use another free-text matcher for the `ingredients` filter
    pub fn with_matcher(db: PgPool, matcher: Arc<dyn IngredientMatcher>) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
            matcher,
        }
    }

    /// List cocktails by name with doability, filtered
    pub async fn list(&self, filter: CocktailFilter) -> AppResult<Vec<CocktailWithDoability>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(&s.to_lowercase())));
        let base_spirit = filter
            .base_spirit
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "all");

        let cocktails = sqlx::query_as::<_, Cocktail>(
            r#"
            SELECT id, name, description, cocktail_type, base_spirit, glass, ice, ice_type,
                   method, garnish, image_url, created_at, updated_at
            FROM cocktails
            WHERE ($1::text IS NULL OR LOWER(name) LIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR base_spirit = $2)
            ORDER BY name
            "#,
        )
        .bind(&search)
        .bind(base_spirit)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = cocktails.iter().map(|c| c.id).collect();
        let mut recipes = self.fetch_recipes(&ids).await?;
        let typed = filter
            .ingredients
            .as_deref()
            .map(parse_ingredient_list)
            .unwrap_or_default();

        let result = cocktails
            .into_iter()
            .map(|c| {
                let lines = recipes.remove(&c.id).unwrap_or_default();
                CocktailWithDoability::build(c, lines)
            })
            .filter(|c| filter.mode.accepts(&c.doability))
            .filter(|c| can_make_with(&c.lines(), &typed, self.matcher.as_ref()))
            .collect();

        Ok(result)
    }

    /// One cocktail; required ingredients first, then optional ones
    pub async fn get(&self, id: Uuid) -> AppResult<CocktailWithDoability> {
        let cocktail = self.fetch_cocktail(id).await?;
        let mut lines = self
            .fetch_recipes(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        lines.sort_by_key(|l| l.line.is_optional);
        Ok(CocktailWithDoability::build(cocktail, lines))
    }

    /// Cost of goods for one cocktail
    pub async fn cost(&self, id: Uuid) -> AppResult<CocktailCost> {
        let cocktail = self.fetch_cocktail(id).await?;
        let lines: Vec<RecipeLine> = self
            .fetch_recipes(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.line)
            .collect();

        Ok(CocktailCost {
            cocktail_id: cocktail.id,
            cocktail_name: cocktail.name,
            cost: compute_cost(&lines)?,
        })
    }

    /// Cost and suggested price for every cocktail
    pub async fn cost_report(&self, margin_factor: Decimal) -> AppResult<Vec<CocktailCostReport>> {
        if margin_factor <= Decimal::ZERO {
            return Err(AppError::validation(
                "margin",
                "Margin factor must be greater than zero",
                "Le coefficient de marge doit être supérieur à zéro",
            ));
        }

        let cocktails = sqlx::query_as::<_, Cocktail>(
            r#"
            SELECT id, name, description, cocktail_type, base_spirit, glass, ice, ice_type,
                   method, garnish, image_url, created_at, updated_at
            FROM cocktails
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = cocktails.iter().map(|c| c.id).collect();
        let mut recipes = self.fetch_recipes(&ids).await?;

        cocktails
            .into_iter()
            .map(|c| -> AppResult<CocktailCostReport> {
                let lines: Vec<RecipeLine> = recipes
                    .remove(&c.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|v| v.line)
                    .collect();
                let cost = compute_cost(&lines)?;
                let pricing = suggest_price(cost.total_cost, margin_factor)?;
                Ok(CocktailCostReport {
                    cocktail_id: c.id,
                    cocktail_name: c.name,
                    cocktail_type: c.cocktail_type,
                    cost,
                    pricing,
                })
            })
            .collect()
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: CocktailInput,
        client: &ClientInfo,
    ) -> AppResult<CocktailWithDoability> {
        input.validate()?;
        validate_cocktail(&input)?;

        let mut tx = self.db.begin().await?;
        Self::ensure_ingredients_exist(&mut tx, &input).await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO cocktails (
                name, description, cocktail_type, base_spirit, glass, ice, ice_type,
                method, garnish, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.cocktail_type)
        .bind(&input.base_spirit)
        .bind(input.glass.trim())
        .bind(input.ice)
        .bind(&input.ice_type)
        .bind(input.method.trim())
        .bind(&input.garnish)
        .bind(&input.image_url)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_recipe(&mut tx, id, &input).await?;
        tx.commit().await?;

        tracing::info!(cocktail_id = %id, name = %input.name, "Cocktail created");
        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::CocktailCreated)
                    .by(actor)
                    .entity("cocktail", id, input.name.trim()),
            )
            .await;

        self.get(id).await
    }

    /// Update a cocktail; its ingredient links are replaced as a set
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: CocktailInput,
        client: &ClientInfo,
    ) -> AppResult<CocktailWithDoability> {
        input.validate()?;
        validate_cocktail(&input)?;

        let mut tx = self.db.begin().await?;
        Self::ensure_ingredients_exist(&mut tx, &input).await?;

        let updated = sqlx::query(
            r#"
            UPDATE cocktails
            SET name = $1, description = $2, cocktail_type = $3, base_spirit = $4,
                glass = $5, ice = $6, ice_type = $7, method = $8, garnish = $9,
                image_url = $10, updated_at = NOW()
            WHERE id = $11
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.cocktail_type)
        .bind(&input.base_spirit)
        .bind(input.glass.trim())
        .bind(input.ice)
        .bind(&input.ice_type)
        .bind(input.method.trim())
        .bind(&input.garnish)
        .bind(&input.image_url)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Cocktail".to_string()));
        }

        Self::replace_recipe(&mut tx, id, &input).await?;
        tx.commit().await?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::CocktailUpdated)
                    .by(actor)
                    .entity("cocktail", id, input.name.trim())
                    .details(format!("{} ingredients", input.ingredients.len())),
            )
            .await;

        self.get(id).await
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid, client: &ClientInfo) -> AppResult<()> {
        let name = sqlx::query_scalar::<_, String>(
            "DELETE FROM cocktails WHERE id = $1 RETURNING name",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Cocktail".to_string()))?;

        self.audit
            .record(
                client,
                AuditEntry::new(AuditAction::CocktailDeleted)
                    .by(actor)
                    .entity("cocktail", id, name),
            )
            .await;

        Ok(())
    }

    /// Count a view for popularity stats
    pub async fn record_view(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
        client: &ClientInfo,
    ) -> AppResult<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO cocktail_views (cocktail_id, user_id, ip_address)
            SELECT id, $2, $3 FROM cocktails WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&client.ip_address)
        .execute(&self.db)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::NotFound("Cocktail".to_string()));
        }
        Ok(())
    }

    async fn fetch_cocktail(&self, id: Uuid) -> AppResult<Cocktail> {
        sqlx::query_as::<_, Cocktail>(
            r#"
            SELECT id, name, description, cocktail_type, base_spirit, glass, ice, ice_type,
                   method, garnish, image_url, created_at, updated_at
            FROM cocktails WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Cocktail".to_string()))
    }

    /// Recipe lines per cocktail, in recipe order
    async fn fetch_recipes(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<RecipeLineView>>> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT ci.cocktail_id, ci.ingredient_id, i.name AS ingredient_name,
                   ci.quantity, ci.unit, ci.is_optional, i.cost_per_unit,
                   COALESCE(ba.available, FALSE) AS available
            FROM cocktail_ingredients ci
            JOIN ingredients i ON i.id = ci.ingredient_id
            LEFT JOIN bar_availability ba ON ba.ingredient_id = ci.ingredient_id
            WHERE ci.cocktail_id = ANY($1)
            ORDER BY ci.cocktail_id, ci.position
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        let mut recipes: HashMap<Uuid, Vec<RecipeLineView>> = HashMap::new();
        for row in rows {
            recipes.entry(row.cocktail_id).or_default().push(row.into());
        }
        Ok(recipes)
    }

    async fn ensure_ingredients_exist(
        tx: &mut Transaction<'_, Postgres>,
        input: &CocktailInput,
    ) -> AppResult<()> {
        let ids: Vec<Uuid> = input.ingredients.iter().map(|l| l.ingredient_id).collect();
        let known: HashSet<Uuid> =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM ingredients WHERE id = ANY($1)")
                .bind(&ids)
                .fetch_all(&mut **tx)
                .await?
                .into_iter()
                .collect();

        match ids.iter().find(|id| !known.contains(id)) {
            Some(missing) => Err(AppError::NotFound(format!("Ingredient {}", missing))),
            None => Ok(()),
        }
    }

    /// Drop every link of the cocktail and recreate them from the input
    async fn replace_recipe(
        tx: &mut Transaction<'_, Postgres>,
        cocktail_id: Uuid,
        input: &CocktailInput,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM cocktail_ingredients WHERE cocktail_id = $1")
            .bind(cocktail_id)
            .execute(&mut **tx)
            .await?;

        for (position, line) in input.ingredients.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cocktail_ingredients (
                    cocktail_id, ingredient_id, quantity, unit, is_optional, position
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(cocktail_id)
            .bind(line.ingredient_id)
            .bind(line.quantity)
            .bind(&line.unit)
            .bind(line.is_optional)
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
