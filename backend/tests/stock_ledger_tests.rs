//! Stock ledger tests
//!
//! Movement application, balance replay and status classification:
//! - Balances never go negative
//! - Replaying the movement log rebuilds the stored balance
//! - Status only worsens as the balance drops

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    apply_movement, check_storable, classify_status, replay_balance, LedgerError,
    MovementRequest, MovementType, StockMovement, StockStatus,
};
use std::str::FromStr;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn request(movement_type: MovementType, quantity: Decimal) -> MovementRequest {
    MovementRequest {
        movement_type,
        quantity,
        unit: None,
    }
}

fn movement(stock_id: Uuid, movement_type: MovementType, quantity: Decimal) -> StockMovement {
    StockMovement {
        id: Uuid::new_v4(),
        stock_id,
        movement_type,
        quantity,
        unit: "ml".to_string(),
        reason: None,
        user_id: None,
        created_at: Utc::now(),
    }
}

fn status_rank(status: StockStatus) -> u8 {
    match status {
        StockStatus::Normal => 0,
        StockStatus::Low => 1,
        StockStatus::Critical => 2,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_restock_adds_and_stamps_date() {
        let outcome =
            apply_movement(dec("100"), "ml", &request(MovementType::Restock, dec("50")), true)
                .unwrap();
        assert_eq!(outcome.previous_quantity, dec("100"));
        assert_eq!(outcome.new_quantity, dec("150"));
        assert_eq!(outcome.unit, "ml");
        assert!(outcome.stamps_restock_date);
    }

    #[test]
    fn test_usage_down_to_exactly_zero() {
        let outcome =
            apply_movement(dec("70"), "cl", &request(MovementType::Usage, dec("70")), true)
                .unwrap();
        assert_eq!(outcome.new_quantity, Decimal::ZERO);
        assert!(!outcome.stamps_restock_date);
    }

    #[test]
    fn test_overdraw_is_rejected_with_details() {
        let err = apply_movement(dec("5"), "cl", &request(MovementType::Waste, dec("6")), true)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                requested: dec("6"),
                available: dec("5"),
                unit: "cl".to_string(),
            }
        );
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        for quantity in [Decimal::ZERO, dec("-1")] {
            let err = apply_movement(
                dec("10"),
                "ml",
                &request(MovementType::Adjustment, quantity),
                true,
            )
            .unwrap_err();
            assert_eq!(err, LedgerError::NonPositiveQuantity(quantity));
        }
    }

    #[test]
    fn test_maximal_quantity_is_rejected_without_panicking() {
        let err = apply_movement(
            Decimal::ONE,
            "ml",
            &request(MovementType::Restock, Decimal::MAX),
            true,
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange(Decimal::MAX));
    }

    #[test]
    fn test_quantity_finer_than_storage_is_rejected() {
        for quantity in [dec("0.0005"), dec("0.0004")] {
            let err = apply_movement(dec("1"), "ml", &request(MovementType::Usage, quantity), true)
                .unwrap_err();
            assert_eq!(err, LedgerError::TooPrecise(quantity));
        }
    }

    #[test]
    fn test_unit_mismatch_depends_on_strictness() {
        let req = MovementRequest {
            movement_type: MovementType::Restock,
            quantity: dec("1"),
            unit: Some("bottle".to_string()),
        };
        assert!(matches!(
            apply_movement(dec("10"), "ml", &req, true),
            Err(LedgerError::UnitMismatch { .. })
        ));

        let outcome = apply_movement(dec("10"), "ml", &req, false).unwrap();
        assert_eq!(outcome.unit, "bottle");
        assert_eq!(outcome.new_quantity, dec("11"));
    }

    #[test]
    fn test_unit_comparison_ignores_case_and_spaces() {
        let req = MovementRequest {
            movement_type: MovementType::Usage,
            quantity: dec("2"),
            unit: Some(" CL ".to_string()),
        };
        assert!(apply_movement(dec("10"), "cl", &req, true).is_ok());
    }

    #[test]
    fn test_unknown_movement_type() {
        assert_eq!(
            "theft".parse::<MovementType>(),
            Err(LedgerError::UnknownMovementType("theft".to_string()))
        );
        for t in MovementType::ALL {
            assert_eq!(t.as_str().parse::<MovementType>(), Ok(t));
        }
    }

    #[test]
    fn test_replay_with_initial_restock() {
        let stock_id = Uuid::new_v4();
        let log = vec![
            movement(stock_id, MovementType::Restock, dec("700")),
            movement(stock_id, MovementType::Usage, dec("40")),
            movement(stock_id, MovementType::Waste, dec("10")),
            movement(stock_id, MovementType::Adjustment, dec("5")),
        ];
        assert_eq!(replay_balance(&log), dec("655"));
    }

    #[test]
    fn test_status_boundaries() {
        let min = Some(dec("20"));
        assert_eq!(classify_status(dec("20"), min), StockStatus::Critical);
        assert_eq!(classify_status(dec("30"), min), StockStatus::Low);
        assert_eq!(classify_status(dec("30.001"), min), StockStatus::Normal);
        assert_eq!(classify_status(Decimal::ZERO, None), StockStatus::Normal);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// 0.1 to 1000.0
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn movement_type_strategy() -> impl Strategy<Value = MovementType> {
        prop_oneof![
            Just(MovementType::Restock),
            Just(MovementType::Usage),
            Just(MovementType::Waste),
            Just(MovementType::Adjustment),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Any sequence of movements, accepted or rejected, keeps the balance >= 0
        #[test]
        fn prop_balance_never_negative(
            ops in prop::collection::vec((movement_type_strategy(), quantity_strategy()), 1..40)
        ) {
            let mut balance = Decimal::ZERO;
            for (movement_type, quantity) in ops {
                match apply_movement(balance, "ml", &request(movement_type, quantity), true) {
                    Ok(outcome) => {
                        prop_assert_eq!(outcome.previous_quantity, balance);
                        balance = outcome.new_quantity;
                    }
                    Err(LedgerError::InsufficientStock { available, .. }) => {
                        prop_assert!(movement_type.is_withdrawal());
                        prop_assert_eq!(available, balance);
                    }
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                }
                prop_assert!(balance >= Decimal::ZERO);
            }
        }

        /// The balance equals the replay of the accepted movements
        #[test]
        fn prop_replay_matches_balance(
            initial in quantity_strategy(),
            ops in prop::collection::vec((movement_type_strategy(), quantity_strategy()), 0..40)
        ) {
            let stock_id = Uuid::new_v4();
            let mut log = vec![movement(stock_id, MovementType::Restock, initial)];
            let mut balance = initial;

            for (movement_type, quantity) in ops {
                if let Ok(outcome) =
                    apply_movement(balance, "ml", &request(movement_type, quantity), true)
                {
                    balance = outcome.new_quantity;
                    log.push(movement(stock_id, movement_type, quantity));
                }
            }

            prop_assert_eq!(replay_balance(&log), balance);
        }

        /// Arbitrary decimals never panic; accepted movements stay storable
        #[test]
        fn prop_any_decimal_is_handled(
            current in quantity_strategy(),
            movement_type in movement_type_strategy(),
            lo in any::<u32>(),
            mid in any::<u32>(),
            hi in any::<u32>(),
            scale in 0u32..=28,
        ) {
            let quantity = Decimal::from_parts(lo, mid, hi, false, scale);
            if let Ok(outcome) =
                apply_movement(current, "ml", &request(movement_type, quantity), true)
            {
                prop_assert!(check_storable(quantity).is_ok());
                prop_assert!(check_storable(outcome.new_quantity).is_ok());
            }
        }

        /// Lowering the balance never improves the status
        #[test]
        fn prop_status_monotonic(
            a in quantity_strategy(),
            b in quantity_strategy(),
            min in quantity_strategy()
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                status_rank(classify_status(low, Some(min)))
                    >= status_rank(classify_status(high, Some(min)))
            );
        }
    }
}
