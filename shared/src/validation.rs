//! Validation utilities for the bar management application
//!
//! Field-level checks that complement the `validator` derives on input
//! payloads. Each failure names the offending field so the API can point
//! the back office at it.

use std::collections::HashSet;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{check_storable, validate_thresholds, CocktailInput, IngredientInput};
use crate::types::fits_numeric;

/// Minimum password length accepted on password change
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Recipe quantities are `NUMERIC(12, 3)`
const RECIPE_QUANTITY_DIGITS: (u32, u32) = (12, 3);
/// Ingredient costs are `NUMERIC(12, 4)`
const COST_DIGITS: (u32, u32) = (12, 4);

/// A rejected field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationFailure {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationFailure> {
    if value.trim().is_empty() {
        return Err(ValidationFailure::new(field, "must not be blank"));
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), ValidationFailure> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationFailure::new("email", "invalid email format")),
    }
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ValidationFailure> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationFailure::new(
            "newPassword",
            "password must be at least 6 characters",
        ));
    }
    Ok(())
}

// ============================================================================
// Stock Validations
// ============================================================================

fn require_storable(field: &'static str, quantity: Decimal) -> Result<(), ValidationFailure> {
    check_storable(quantity).map_err(|_| {
        ValidationFailure::new(
            field,
            "must have at most 3 decimals and fewer than 12 integer digits",
        )
    })
}

/// Planned restock quantities are strictly positive and storable
pub fn validate_planned_quantity(quantity: Decimal) -> Result<(), ValidationFailure> {
    if quantity <= Decimal::ZERO {
        return Err(ValidationFailure::new("quantity", "must be greater than zero"));
    }
    require_storable("quantity", quantity)
}

/// Initial stock may be zero but never negative
pub fn validate_initial_quantity(quantity: Decimal) -> Result<(), ValidationFailure> {
    if quantity < Decimal::ZERO {
        return Err(ValidationFailure::new("quantity", "cannot be negative"));
    }
    require_storable("quantity", quantity)
}

/// Threshold bounds: non-negative, and min <= max when both are set
pub fn validate_stock_thresholds(
    min_threshold: Option<Decimal>,
    max_threshold: Option<Decimal>,
) -> Result<(), ValidationFailure> {
    validate_thresholds(min_threshold, max_threshold)
        .map_err(|message| ValidationFailure::new("minThreshold", message))
}

/// Unit strings are free text but never blank
pub fn validate_unit(unit: &str) -> Result<(), ValidationFailure> {
    require_text("unit", unit)
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Checks beyond the derive: blank strings, negative costs
pub fn validate_ingredient(input: &IngredientInput) -> Result<(), ValidationFailure> {
    require_text("name", &input.name)?;
    require_text("category", &input.category)?;
    if let Some(cost) = input.cost_per_unit {
        if cost < Decimal::ZERO {
            return Err(ValidationFailure::new("costPerUnit", "cannot be negative"));
        }
        if !fits_numeric(cost, COST_DIGITS.0, COST_DIGITS.1) {
            return Err(ValidationFailure::new(
                "costPerUnit",
                "must have at most 4 decimals and fewer than 9 integer digits",
            ));
        }
    }
    Ok(())
}

/// Checks beyond the derive: blank strings, repeated or negative lines
pub fn validate_cocktail(input: &CocktailInput) -> Result<(), ValidationFailure> {
    require_text("name", &input.name)?;
    require_text("glass", &input.glass)?;
    require_text("method", &input.method)?;
    if input.ingredients.is_empty() {
        return Err(ValidationFailure::new(
            "ingredients",
            "at least one ingredient is required",
        ));
    }

    let mut seen = HashSet::new();
    for line in &input.ingredients {
        if !seen.insert(line.ingredient_id) {
            return Err(ValidationFailure::new(
                "ingredients",
                "an ingredient appears more than once",
            ));
        }
        if let Some(quantity) = line.quantity {
            if quantity < Decimal::ZERO {
                return Err(ValidationFailure::new("ingredients", "quantity cannot be negative"));
            }
            if !fits_numeric(quantity, RECIPE_QUANTITY_DIGITS.0, RECIPE_QUANTITY_DIGITS.1) {
                return Err(ValidationFailure::new(
                    "ingredients",
                    "quantity must have at most 3 decimals and fewer than 10 integer digits",
                ));
            }
        }
    }
    Ok(())
}
