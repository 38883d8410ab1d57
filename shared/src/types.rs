//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit assigned to stock rows and movements when none is supplied
pub const DEFAULT_UNIT: &str = "ml";

/// A decimal quantity tagged with its unit (e.g. `5.0 cl`), for display
///
/// Units are free text and never converted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quantity {
    pub amount: Decimal,
    pub unit: String,
}

impl Quantity {
    pub fn new(amount: Decimal, unit: impl Into<String>) -> Self {
        Self {
            amount,
            unit: unit.into(),
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount.normalize(), self.unit)
    }
}

/// Whether `value` is stored by a `NUMERIC(precision, scale)` column unchanged
///
/// Trailing zeros do not count against the scale. Values that would be
/// rounded or overflow the integer part do not fit.
pub fn fits_numeric(value: Decimal, precision: u32, scale: u32) -> bool {
    let value = value.normalize();
    if value.scale() > scale {
        return false;
    }
    match 10u64.checked_pow(precision.saturating_sub(scale)) {
        Some(limit) => value.abs() < Decimal::from(limit),
        None => true,
    }
}

/// Compare two free-text unit labels
pub fn units_match(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

/// Supported languages for error and export labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub const MAX_PER_PAGE: u32 = 500;

    /// Clamp to sane bounds: page starts at 1, page size within 1..=500
    pub fn normalized(page: Option<u32>, per_page: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            page: page.unwrap_or(defaults.page).max(1),
            per_page: per_page
                .unwrap_or(defaults.per_page)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let per_page = u64::from(pagination.per_page.max(1));
        let total_pages = total_items.div_ceil(per_page);
        Self {
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fits_numeric_scale() {
        assert!(fits_numeric(dec!(0.125), 14, 3));
        assert!(fits_numeric(dec!(1.5000), 14, 3));
        assert!(!fits_numeric(dec!(0.0005), 14, 3));
        assert!(fits_numeric(dec!(0.0005), 12, 4));
    }

    #[test]
    fn test_fits_numeric_magnitude() {
        assert!(fits_numeric(dec!(99999999999.999), 14, 3));
        assert!(!fits_numeric(dec!(100000000000), 14, 3));
        assert!(!fits_numeric(dec!(-100000000000), 14, 3));
        assert!(!fits_numeric(Decimal::MAX, 14, 3));
        assert!(fits_numeric(dec!(999999999), 12, 3));
        assert!(!fits_numeric(dec!(1000000000), 12, 3));
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(Quantity::new(dec!(5.00), "cl").to_string(), "5 cl");
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::normalized(Some(0), Some(10_000));
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, Pagination::MAX_PER_PAGE);
        assert_eq!(p.offset(), 0);

        let p = Pagination::normalized(Some(3), Some(50));
        assert_eq!(p.offset(), 100);
    }

    #[test]
    fn test_pagination_meta() {
        let p = Pagination::normalized(Some(1), Some(50));
        let meta = PaginationMeta::new(&p, 101);
        assert_eq!(meta.total_pages, 3);
        let empty = PaginationMeta::new(&p, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
