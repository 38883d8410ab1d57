//! WebAssembly module for the bar management front end
//!
//! Lets the browser preview ledger and recipe computations before a request
//! is sent, using the same code as the server:
//! - Stock status and fill level
//! - Movement checks against a known balance
//! - Doability against free-text ingredient lists
//! - Cost of goods and suggested price

use std::str::FromStr;

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::matching::{can_make_with, parse_ingredient_list, FuzzySubstringMatcher};

fn parse_decimal(value: &str, what: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(value.trim())
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

/// Finite numbers only; NaN and infinities have no balance
fn finite_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::try_from(value).ok()
    } else {
        None
    }
}

fn parse_recipe(recipe_json: &str) -> Result<Vec<RecipeLine>, JsValue> {
    serde_json::from_str(recipe_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid recipe JSON: {}", e)))
}

/// "normal", "low" or "critical"
///
/// Throws when the quantity or threshold is not a finite number.
#[wasm_bindgen]
pub fn classify_stock_status(
    quantity: f64,
    min_threshold: Option<f64>,
) -> Result<String, JsValue> {
    let invalid =
        |what: &str| JsValue::from_str(&format!("Invalid {}: not a finite number", what));
    let quantity = finite_decimal(quantity).ok_or_else(|| invalid("quantity"))?;
    let min = min_threshold
        .map(|m| finite_decimal(m).ok_or_else(|| invalid("minimum threshold")))
        .transpose()?;
    Ok(classify_status(quantity, min).to_string())
}

/// Fill level in percent of the maximum threshold
#[wasm_bindgen]
pub fn stock_fill_percent(quantity: f64, max_threshold: Option<f64>) -> Option<f64> {
    let quantity = finite_decimal(quantity)?;
    let max = max_threshold.and_then(finite_decimal);
    fill_percent(quantity, max).and_then(|p| p.to_string().parse().ok())
}

/// Balance after a movement, as a decimal string
///
/// Throws with the ledger's message when the movement would be rejected.
#[wasm_bindgen]
pub fn preview_movement(
    current: &str,
    stock_unit: &str,
    movement_type: &str,
    quantity: &str,
    unit: Option<String>,
) -> Result<String, JsValue> {
    let current = parse_decimal(current, "balance")?;
    let request = MovementRequest {
        movement_type: MovementType::from_str(movement_type)
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
        quantity: parse_decimal(quantity, "quantity")?,
        unit,
    };

    apply_movement(current, stock_unit, &request, true)
        .map(|outcome| outcome.new_quantity.to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether a recipe can be made from a comma-separated ingredient list
#[wasm_bindgen]
pub fn can_make_cocktail(recipe_json: &str, ingredients: &str) -> Result<bool, JsValue> {
    let lines = parse_recipe(recipe_json)?;
    let typed = parse_ingredient_list(ingredients);
    Ok(can_make_with(&lines, &typed, &FuzzySubstringMatcher))
}

/// Cost breakdown of a recipe, as JSON
#[wasm_bindgen]
pub fn compute_cocktail_cost(recipe_json: &str) -> Result<String, JsValue> {
    let lines = parse_recipe(recipe_json)?;
    let cost = compute_cost(&lines).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&cost)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Suggested selling price for a cost; `undefined` when the cost is unknown
#[wasm_bindgen]
pub fn suggest_cocktail_price(
    total_cost: Option<String>,
    margin_factor: &str,
) -> Result<Option<String>, JsValue> {
    let cost = total_cost
        .as_deref()
        .map(|c| parse_decimal(c, "cost"))
        .transpose()?;
    let margin = parse_decimal(margin_factor, "margin factor")?;
    suggest_price(cost, margin)
        .map(|s| s.suggested_price.map(|p| p.to_string()))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPE: &str = r#"[
        {"ingredientId": "6f1c1f2e-1d2b-4a7e-9a55-0c7c3b1f1a01", "ingredientName": "Gin",
         "quantity": "5", "unit": "cl", "isOptional": false, "costPerUnit": "0.8"},
        {"ingredientId": "6f1c1f2e-1d2b-4a7e-9a55-0c7c3b1f1a02", "ingredientName": "Jus de citron vert",
         "quantity": "2", "unit": "cl", "isOptional": false, "costPerUnit": "0.25"},
        {"ingredientId": "6f1c1f2e-1d2b-4a7e-9a55-0c7c3b1f1a03", "ingredientName": "Menthe",
         "quantity": null, "unit": null, "isOptional": true, "costPerUnit": null}
    ]"#;

    #[test]
    fn test_classify_stock_status() {
        assert_eq!(classify_stock_status(5.0, Some(10.0)).unwrap(), "critical");
        assert_eq!(classify_stock_status(12.0, Some(10.0)).unwrap(), "low");
        assert_eq!(classify_stock_status(50.0, Some(10.0)).unwrap(), "normal");
        assert_eq!(classify_stock_status(0.0, None).unwrap(), "normal");
    }

    #[test]
    fn test_non_finite_numbers_have_no_decimal() {
        assert_eq!(finite_decimal(f64::NAN), None);
        assert_eq!(finite_decimal(f64::INFINITY), None);
        assert_eq!(finite_decimal(f64::NEG_INFINITY), None);
        assert_eq!(finite_decimal(2.5), Some(Decimal::from_str("2.5").unwrap()));
    }

    #[test]
    fn test_fill_percent() {
        assert_eq!(stock_fill_percent(50.0, Some(200.0)), Some(25.0));
        assert_eq!(stock_fill_percent(50.0, None), None);
        assert_eq!(stock_fill_percent(f64::NAN, Some(200.0)), None);
    }

    #[test]
    fn test_can_make_cocktail() {
        assert!(can_make_cocktail(RECIPE, "gin, citron").unwrap());
        assert!(!can_make_cocktail(RECIPE, "gin").unwrap());
        assert!(can_make_cocktail(RECIPE, "").unwrap());
    }

    #[test]
    fn test_compute_cocktail_cost() {
        let json = compute_cocktail_cost(RECIPE).unwrap();
        let cost: CostBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(cost.total_cost, Some(Decimal::from_str("4.5").unwrap()));
        assert_eq!(cost.breakdown.len(), 3);
        assert!(!cost.has_all_costs);
    }

    #[test]
    fn test_suggest_price() {
        let price = suggest_cocktail_price(Some("4.5".into()), "3").unwrap().unwrap();
        assert_eq!(Decimal::from_str(&price).unwrap(), Decimal::from_str("13.5").unwrap());
        assert_eq!(suggest_cocktail_price(None, "3").unwrap(), None);
    }
}
