//! Cocktail and recipe models
//!
//! Doability is derived on every read from the recipe lines and the current
//! bar availability; nothing here is persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A cocktail missing at most this many required ingredients is "almost" doable
pub const ALMOST_DOABLE_MAX_MISSING: usize = 2;

/// Serving style of a cocktail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "cocktail_type"))]
pub enum CocktailType {
    #[serde(rename = "Short drink")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Short drink"))]
    ShortDrink,
    #[serde(rename = "Long drink")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Long drink"))]
    LongDrink,
    #[serde(rename = "Shot")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Shot"))]
    Shot,
}

impl CocktailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CocktailType::ShortDrink => "Short drink",
            CocktailType::LongDrink => "Long drink",
            CocktailType::Shot => "Shot",
        }
    }
}

impl std::fmt::Display for CocktailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingredient line of a recipe, joined with the ingredient's catalog data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub is_optional: bool,
    pub cost_per_unit: Option<Decimal>,
}

impl RecipeLine {
    pub fn is_required(&self) -> bool {
        !self.is_optional
    }
}

/// Derived availability facts for a cocktail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Doability {
    pub required_count: usize,
    pub available_count: usize,
    pub missing_count: usize,
    /// Required-but-unavailable ingredient names, in recipe order
    pub missing_ingredients: Vec<String>,
    pub is_doable: bool,
    pub is_almost: bool,
}

impl Doability {
    fn from_counts(required_count: usize, missing_ingredients: Vec<String>) -> Self {
        let missing_count = missing_ingredients.len();
        Self {
            required_count,
            available_count: required_count - missing_count,
            missing_count,
            missing_ingredients,
            is_doable: missing_count == 0,
            is_almost: missing_count > 0 && missing_count <= ALMOST_DOABLE_MAX_MISSING,
        }
    }
}

/// Resolve doability against an availability lookup
///
/// Optional lines never count. A recipe with no required line is doable.
pub fn resolve<F>(lines: &[RecipeLine], is_available: F) -> Doability
where
    F: Fn(Uuid) -> bool,
{
    let required: Vec<&RecipeLine> = lines.iter().filter(|l| l.is_required()).collect();
    let missing = required
        .iter()
        .filter(|l| !is_available(l.ingredient_id))
        .map(|l| l.ingredient_name.clone())
        .collect();
    Doability::from_counts(required.len(), missing)
}

/// List filter applied after doability is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoabilityMode {
    #[default]
    All,
    Doable,
    Almost,
}

impl DoabilityMode {
    pub fn accepts(&self, doability: &Doability) -> bool {
        match self {
            DoabilityMode::All => true,
            DoabilityMode::Doable => doability.is_doable,
            DoabilityMode::Almost => doability.is_almost,
        }
    }
}

/// Ingredient link supplied when a cocktail is saved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailIngredientInput {
    pub ingredient_id: Uuid,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
}

/// Full cocktail payload; links replace the existing set on update
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CocktailInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub cocktail_type: CocktailType,
    pub base_spirit: Option<String>,
    #[validate(length(min = 1))]
    pub glass: String,
    pub ice: bool,
    pub ice_type: Option<String>,
    #[validate(length(min = 1))]
    pub method: String,
    pub garnish: Option<String>,
    pub image_url: Option<String>,
    #[validate(length(min = 1))]
    pub ingredients: Vec<CocktailIngredientInput>,
}

impl CocktailInput {
    /// Method text split into non-empty steps
    pub fn method_steps(&self) -> Vec<&str> {
        method_steps(&self.method)
    }
}

/// Split newline-delimited method text into trimmed steps
pub fn method_steps(method: &str) -> Vec<&str> {
    method
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn line(name: &str, optional: bool) -> RecipeLine {
        RecipeLine {
            ingredient_id: Uuid::new_v4(),
            ingredient_name: name.to_string(),
            quantity: None,
            unit: None,
            is_optional: optional,
            cost_per_unit: None,
        }
    }

    #[test]
    fn test_one_missing_is_almost() {
        let lines = vec![line("A", false), line("B", false)];
        let available: HashSet<Uuid> = [lines[0].ingredient_id].into_iter().collect();
        let d = resolve(&lines, |id| available.contains(&id));
        assert_eq!(d.required_count, 2);
        assert_eq!(d.available_count, 1);
        assert_eq!(d.missing_count, 1);
        assert_eq!(d.missing_ingredients, vec!["B".to_string()]);
        assert!(!d.is_doable);
        assert!(d.is_almost);
    }

    #[test]
    fn test_all_optional_is_doable() {
        let lines = vec![line("Mint", true), line("Lime", true)];
        let d = resolve(&lines, |_| false);
        assert_eq!(d.required_count, 0);
        assert!(d.is_doable);
        assert!(!d.is_almost);
    }

    #[test]
    fn test_three_missing_is_not_almost() {
        let lines = vec![line("A", false), line("B", false), line("C", false)];
        let d = resolve(&lines, |_| false);
        assert_eq!(d.missing_count, 3);
        assert!(!d.is_almost);
        assert!(!d.is_doable);
    }

    #[test]
    fn test_missing_names_keep_recipe_order() {
        let lines = vec![line("Gin", false), line("Tonic", true), line("Lime", false)];
        let d = resolve(&lines, |_| false);
        assert_eq!(d.missing_ingredients, vec!["Gin", "Lime"]);
    }

    #[test]
    fn test_mode_filter() {
        let doable = Doability::from_counts(1, vec![]);
        let almost = Doability::from_counts(2, vec!["X".into()]);
        assert!(DoabilityMode::Doable.accepts(&doable));
        assert!(!DoabilityMode::Doable.accepts(&almost));
        assert!(DoabilityMode::Almost.accepts(&almost));
        assert!(!DoabilityMode::Almost.accepts(&doable));
        assert!(DoabilityMode::All.accepts(&almost));
    }

    #[test]
    fn test_cocktail_type_wire_names() {
        let t: CocktailType = serde_json::from_str("\"Long drink\"").unwrap();
        assert_eq!(t, CocktailType::LongDrink);
        assert_eq!(serde_json::to_string(&CocktailType::Shot).unwrap(), "\"Shot\"");
    }

    #[test]
    fn test_method_steps() {
        let steps = method_steps("Pour gin\n\n  Top with tonic  \n");
        assert_eq!(steps, vec!["Pour gin", "Top with tonic"]);
    }
}
