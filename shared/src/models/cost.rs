//! Cost of goods for cocktails

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::RecipeLine;

/// Suggested price multiplier applied to the cost of goods by default
pub const DEFAULT_MARGIN_FACTOR: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Raised when a cost or price does not fit in a decimal
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CostError {
    #[error("cost of {0} is out of range")]
    LineOverflow(String),

    #[error("total cost is out of range")]
    TotalOverflow,

    #[error("price for margin factor {0} is out of range")]
    PriceOverflow(Decimal),
}

/// One priced (or unpriced) line of a cocktail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Option<Decimal>,
    pub subtotal: Option<Decimal>,
    pub is_optional: bool,
}

/// Cost breakdown of a cocktail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    /// `None` when no line could be priced, so "unknown" never reads as "free"
    pub total_cost: Option<Decimal>,
    pub breakdown: Vec<CostLine>,
    /// False when any line lacks a price or a positive quantity; the total is then a lower bound
    pub has_all_costs: bool,
}

/// Compute the cost of goods from recipe lines
pub fn compute_cost(lines: &[RecipeLine]) -> Result<CostBreakdown, CostError> {
    let breakdown = lines
        .iter()
        .map(|line| {
            let quantity = line.quantity.unwrap_or(Decimal::ZERO);
            let subtotal = match line.cost_per_unit {
                Some(cost) if quantity > Decimal::ZERO => Some(
                    cost.checked_mul(quantity)
                        .ok_or_else(|| CostError::LineOverflow(line.ingredient_name.clone()))?,
                ),
                _ => None,
            };
            Ok(CostLine {
                ingredient_id: line.ingredient_id,
                ingredient_name: line.ingredient_name.clone(),
                quantity,
                unit: line.unit.clone().unwrap_or_default(),
                cost_per_unit: line.cost_per_unit,
                subtotal,
                is_optional: line.is_optional,
            })
        })
        .collect::<Result<Vec<CostLine>, CostError>>()?;

    let mut total_cost: Option<Decimal> = None;
    for subtotal in breakdown.iter().filter_map(|l| l.subtotal) {
        total_cost = Some(match total_cost {
            Some(acc) => acc.checked_add(subtotal).ok_or(CostError::TotalOverflow)?,
            None => subtotal,
        });
    }

    let has_all_costs = breakdown
        .iter()
        .all(|l| l.cost_per_unit.is_some() && l.quantity > Decimal::ZERO);

    Ok(CostBreakdown {
        total_cost,
        breakdown,
        has_all_costs,
    })
}

/// Suggested selling price and gross margin derived from a cost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestion {
    pub margin_factor: Decimal,
    pub suggested_price: Option<Decimal>,
    pub gross_margin: Option<Decimal>,
}

/// Multiply the cost by the margin factor; unknown cost stays unknown
pub fn suggest_price(
    total_cost: Option<Decimal>,
    margin_factor: Decimal,
) -> Result<PriceSuggestion, CostError> {
    let overflow = || CostError::PriceOverflow(margin_factor);
    let (suggested_price, gross_margin) = match total_cost {
        Some(cost) => {
            let price = cost.checked_mul(margin_factor).ok_or_else(overflow)?.round_dp(2);
            let margin = price.checked_sub(cost).ok_or_else(overflow)?.round_dp(2);
            (Some(price), Some(margin))
        }
        None => (None, None),
    };
    Ok(PriceSuggestion {
        margin_factor,
        suggested_price,
        gross_margin,
    })
}
