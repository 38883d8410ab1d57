//! Ingredient catalog and bar availability

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A catalog ingredient
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub is_alcoholic: bool,
    pub base_spirit: Option<String>,
    pub cost_per_unit: Option<Decimal>,
    pub cost_unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for an ingredient
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IngredientInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub subcategory: Option<String>,
    #[serde(default)]
    pub is_alcoholic: bool,
    pub base_spirit: Option<String>,
    pub cost_per_unit: Option<Decimal>,
    pub cost_unit: Option<String>,
}

/// Manual per-ingredient toggle, independent of stock quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BarAvailability {
    pub ingredient_id: Uuid,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}

/// One entry of an availability upsert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityUpdate {
    pub ingredient_id: Uuid,
    pub available: bool,
}

/// Same flag applied to many ingredients at once
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAvailabilityUpdate {
    pub ingredient_ids: Vec<Uuid>,
    pub available: bool,
}

impl BatchAvailabilityUpdate {
    /// Expand into individual updates, dropping repeated ids
    pub fn into_updates(self) -> Vec<AvailabilityUpdate> {
        let mut seen = std::collections::HashSet::new();
        self.ingredient_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .map(|ingredient_id| AvailabilityUpdate {
                ingredient_id,
                available: self.available,
            })
            .collect()
    }
}

/// Deduplicate an upsert list; the last entry for an id wins
pub fn collapse_updates(updates: &[AvailabilityUpdate]) -> Vec<AvailabilityUpdate> {
    let mut out: Vec<AvailabilityUpdate> = Vec::with_capacity(updates.len());
    for update in updates {
        match out.iter_mut().find(|u| u.ingredient_id == update.ingredient_id) {
            Some(existing) => existing.available = update.available,
            None => out.push(*update),
        }
    }
    out
}
