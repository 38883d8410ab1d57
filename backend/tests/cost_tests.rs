//! Cost engine tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{compute_cost, suggest_price, CostError, RecipeLine, DEFAULT_MARGIN_FACTOR};
use std::str::FromStr;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn priced(name: &str, quantity: Option<Decimal>, cost: Option<Decimal>) -> RecipeLine {
    RecipeLine {
        ingredient_id: Uuid::new_v4(),
        ingredient_name: name.to_string(),
        quantity,
        unit: Some("cl".to_string()),
        is_optional: false,
        cost_per_unit: cost,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_fully_priced_recipe() {
        let lines = vec![
            priced("Gin", Some(dec("5")), Some(dec("0.80"))),
            priced("Tonic", Some(dec("15")), Some(dec("0.05"))),
        ];
        let cost = compute_cost(&lines).unwrap();
        assert_eq!(cost.total_cost, Some(dec("4.75")));
        assert!(cost.has_all_costs);
        assert_eq!(cost.breakdown[0].subtotal, Some(dec("4.00")));
    }

    #[test]
    fn test_partially_priced_recipe_is_lower_bound() {
        let lines = vec![
            priced("Gin", Some(dec("5")), Some(dec("0.80"))),
            priced("Angostura", None, Some(dec("0.10"))),
            priced("Sirop maison", Some(dec("2")), None),
        ];
        let cost = compute_cost(&lines).unwrap();
        assert_eq!(cost.total_cost, Some(dec("4")));
        assert!(!cost.has_all_costs);
        assert_eq!(cost.breakdown.len(), 3);
        assert_eq!(cost.breakdown[1].subtotal, None);
        assert_eq!(cost.breakdown[2].subtotal, None);
    }

    #[test]
    fn test_nothing_priced_is_unknown_not_free() {
        let lines = vec![priced("Menthe", Some(dec("6")), None)];
        let cost = compute_cost(&lines).unwrap();
        assert_eq!(cost.total_cost, None);
        assert!(!cost.has_all_costs);

        let price = suggest_price(cost.total_cost, DEFAULT_MARGIN_FACTOR).unwrap();
        assert_eq!(price.suggested_price, None);
        assert_eq!(price.gross_margin, None);
    }

    #[test]
    fn test_suggested_price_and_margin() {
        let price = suggest_price(Some(dec("1.333")), dec("3")).unwrap();
        assert_eq!(price.suggested_price, Some(dec("4.00")));
        assert_eq!(price.gross_margin, Some(dec("2.67")));
    }

    #[test]
    fn test_unbounded_quantity_reports_overflow() {
        let lines = vec![priced("Gin", Some(Decimal::MAX), Some(dec("2")))];
        assert_eq!(
            compute_cost(&lines),
            Err(CostError::LineOverflow("Gin".to_string()))
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Option<Decimal>> {
        prop::option::of((1i64..=100000i64).prop_map(|n| Decimal::new(n, 2)))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The total is the sum of the priced lines; complete only when all are priced
        #[test]
        fn prop_total_is_sum_of_subtotals(
            lines in prop::collection::vec((amount_strategy(), amount_strategy()), 0..10)
        ) {
            let recipe: Vec<RecipeLine> = lines
                .iter()
                .enumerate()
                .map(|(i, (qty, cost))| priced(&format!("I{}", i), *qty, *cost))
                .collect();
            let cost = compute_cost(&recipe).unwrap();

            let expected: Option<Decimal> = lines
                .iter()
                .filter_map(|(qty, cost)| qty.zip(*cost).map(|(q, c)| q * c))
                .reduce(|a, b| a + b);
            prop_assert_eq!(cost.total_cost, expected);
            prop_assert_eq!(
                cost.has_all_costs,
                lines.iter().all(|(qty, cost)| qty.is_some() && cost.is_some())
            );
            if cost.has_all_costs && !lines.is_empty() {
                prop_assert!(cost.total_cost.is_some());
            }
        }
    }
}
