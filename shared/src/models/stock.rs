//! Stock ledger models
//!
//! Balances only ever change through typed movements. The helpers here hold the
//! arithmetic that the backend runs inside its transaction, so the same rules
//! apply to persisted movements, replays and client-side previews.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{fits_numeric, units_match};

/// Multiplier applied to the minimum threshold below which a row is `low`
pub const LOW_STOCK_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Stored quantities and thresholds are `NUMERIC(14, 3)`
pub const QUANTITY_PRECISION: u32 = 14;
pub const QUANTITY_SCALE: u32 = 3;

/// Reason recorded on the synthetic movement created with a new stock row
pub const INITIAL_STOCK_REASON: &str = "initial stock";

/// Kind of stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "stock_movement_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Restock,
    Usage,
    Waste,
    Adjustment,
}

impl MovementType {
    pub const ALL: [MovementType; 4] = [
        MovementType::Restock,
        MovementType::Usage,
        MovementType::Waste,
        MovementType::Adjustment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Restock => "restock",
            MovementType::Usage => "usage",
            MovementType::Waste => "waste",
            MovementType::Adjustment => "adjustment",
        }
    }

    /// Usage and waste take quantity out of the bar
    pub fn is_withdrawal(&self) -> bool {
        matches!(self, MovementType::Usage | MovementType::Waste)
    }

    /// Signed effect of a movement of `quantity` on the balance
    pub fn signed_delta(&self, quantity: Decimal) -> Decimal {
        if self.is_withdrawal() {
            -quantity
        } else {
            quantity
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restock" => Ok(MovementType::Restock),
            "usage" => Ok(MovementType::Usage),
            "waste" => Ok(MovementType::Waste),
            "adjustment" => Ok(MovementType::Adjustment),
            other => Err(LedgerError::UnknownMovementType(other.to_string())),
        }
    }
}

/// Alert classification derived from quantity and minimum threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Normal,
    Low,
    Critical,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Normal => "normal",
            StockStatus::Low => "low",
            StockStatus::Critical => "critical",
        }
    }

    pub fn needs_attention(&self) -> bool {
        !matches!(self, StockStatus::Normal)
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by ledger arithmetic
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("movement quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("insufficient stock: requested {requested} {unit}, available {available} {unit}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
        unit: String,
    },

    #[error("movement unit {movement} does not match stock unit {stock}")]
    UnitMismatch { stock: String, movement: String },

    #[error("unknown movement type: {0}")]
    UnknownMovementType(String),

    #[error("quantity {0} has more than 3 decimal places")]
    TooPrecise(Decimal),

    #[error("quantity {0} is out of range")]
    OutOfRange(Decimal),
}

/// A stock row as seen by the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit: String,
    pub min_threshold: Option<Decimal>,
    pub max_threshold: Option<Decimal>,
    pub last_restock_date: Option<DateTime<Utc>>,
}

impl Stock {
    pub fn status(&self) -> StockStatus {
        classify_status(self.quantity, self.min_threshold)
    }

    pub fn fill_percent(&self) -> Option<Decimal> {
        fill_percent(self.quantity, self.max_threshold)
    }
}

/// An immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub stock_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub unit: String,
    pub reason: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn signed_delta(&self) -> Decimal {
        self.movement_type.signed_delta(self.quantity)
    }
}

/// A movement about to be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRequest {
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub unit: Option<String>,
}

/// Result of applying a movement to a balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementOutcome {
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
    /// Unit recorded on the movement; the stock unit when none was given
    pub unit: String,
    pub stamps_restock_date: bool,
}

/// Classify a balance against its minimum threshold
///
/// No threshold means no alerting.
pub fn classify_status(quantity: Decimal, min_threshold: Option<Decimal>) -> StockStatus {
    match min_threshold {
        None => StockStatus::Normal,
        Some(min) if quantity <= min => StockStatus::Critical,
        Some(min)
            if min
                .checked_mul(LOW_STOCK_FACTOR)
                .map_or(true, |low| quantity <= low) =>
        {
            StockStatus::Low
        }
        Some(_) => StockStatus::Normal,
    }
}

/// Balance as a percentage of the maximum threshold, capped at 100
pub fn fill_percent(quantity: Decimal, max_threshold: Option<Decimal>) -> Option<Decimal> {
    let max = max_threshold.filter(|m| *m > Decimal::ZERO)?;
    let percent = quantity
        .checked_div(max)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ONE_HUNDRED, |p| p.round_dp(1));
    Some(percent.min(Decimal::ONE_HUNDRED))
}

/// Reject a quantity the ledger tables would round or overflow
pub fn check_storable(quantity: Decimal) -> Result<(), LedgerError> {
    if fits_numeric(quantity, QUANTITY_PRECISION, QUANTITY_SCALE) {
        Ok(())
    } else if quantity.normalize().scale() > QUANTITY_SCALE {
        Err(LedgerError::TooPrecise(quantity))
    } else {
        Err(LedgerError::OutOfRange(quantity))
    }
}

/// Check a movement against the current balance and compute the new one
///
/// Rejections leave the caller's balance untouched; nothing is clamped. Both
/// the movement and the resulting balance must be storable as-is, so the
/// stored balance always equals the sum of the stored movements.
pub fn apply_movement(
    current: Decimal,
    stock_unit: &str,
    request: &MovementRequest,
    strict_units: bool,
) -> Result<MovementOutcome, LedgerError> {
    if request.quantity <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveQuantity(request.quantity));
    }
    check_storable(request.quantity)?;

    let unit = match request.unit.as_deref().map(str::trim) {
        Some(unit) if !unit.is_empty() => {
            if strict_units && !units_match(unit, stock_unit) {
                return Err(LedgerError::UnitMismatch {
                    stock: stock_unit.to_string(),
                    movement: unit.to_string(),
                });
            }
            unit.to_string()
        }
        _ => stock_unit.to_string(),
    };

    let new_quantity = current
        .checked_add(request.movement_type.signed_delta(request.quantity))
        .ok_or(LedgerError::OutOfRange(request.quantity))?;
    if new_quantity < Decimal::ZERO {
        return Err(LedgerError::InsufficientStock {
            requested: request.quantity,
            available: current,
            unit,
        });
    }
    check_storable(new_quantity)?;

    Ok(MovementOutcome {
        previous_quantity: current,
        new_quantity,
        unit,
        stamps_restock_date: request.movement_type == MovementType::Restock,
    })
}

/// Rebuild a balance from zero by replaying movements in order
pub fn replay_balance<'a, I>(movements: I) -> Decimal
where
    I: IntoIterator<Item = &'a StockMovement>,
{
    movements
        .into_iter()
        .map(StockMovement::signed_delta)
        .sum()
}

/// Validate threshold bounds before they are stored
pub fn validate_thresholds(
    min_threshold: Option<Decimal>,
    max_threshold: Option<Decimal>,
) -> Result<(), &'static str> {
    let storable = |t: Option<Decimal>| t.map_or(true, |t| check_storable(t).is_ok());
    if !storable(min_threshold) || !storable(max_threshold) {
        return Err("Thresholds must have at most 3 decimals and fewer than 12 integer digits");
    }
    if min_threshold.is_some_and(|m| m < Decimal::ZERO) {
        return Err("Minimum threshold cannot be negative");
    }
    if max_threshold.is_some_and(|m| m < Decimal::ZERO) {
        return Err("Maximum threshold cannot be negative");
    }
    if let (Some(min), Some(max)) = (min_threshold, max_threshold) {
        if min > max {
            return Err("Minimum threshold cannot exceed maximum threshold");
        }
    }
    Ok(())
}
