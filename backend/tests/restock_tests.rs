//! Restock schedule tests

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{classify_schedule, partition_schedules, RestockSchedule, RestockStatus};
use uuid::Uuid;

fn schedule(scheduled_date: DateTime<Utc>, completed: bool) -> RestockSchedule {
    RestockSchedule {
        id: Uuid::new_v4(),
        ingredient_id: Uuid::new_v4(),
        scheduled_date,
        quantity: Decimal::from(12),
        unit: "bottle".to_string(),
        notes: None,
        completed,
        completed_at: None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_due_now_is_still_upcoming() {
        let now = Utc::now();
        assert_eq!(classify_schedule(false, now, now), RestockStatus::Upcoming);
        assert_eq!(
            classify_schedule(false, now - Duration::seconds(1), now),
            RestockStatus::Overdue
        );
    }

    #[test]
    fn test_completed_wins_over_date() {
        let now = Utc::now();
        let s = schedule(now - Duration::days(30), true);
        assert_eq!(s.status_at(now), RestockStatus::Completed);
    }

    #[test]
    fn test_second_completion_keeps_first_timestamp() {
        let first = Utc::now();
        let mut s = schedule(first - Duration::days(1), false);
        assert!(s.complete(first));
        assert!(!s.complete(first + Duration::hours(3)));
        assert!(s.completed);
        assert_eq!(s.completed_at, Some(first));
    }

    #[test]
    fn test_partition_keeps_input_order() {
        let now = Utc::now();
        let items = vec![
            schedule(now + Duration::days(1), false),
            schedule(now - Duration::days(2), false),
            schedule(now + Duration::days(5), false),
            schedule(now - Duration::days(9), true),
        ];
        let ids: Vec<Uuid> = items.iter().map(|s| s.id).collect();
        let partition = partition_schedules(items, now, |s, at| s.status_at(at));

        assert_eq!(partition.counts(), (2, 1, 1));
        assert_eq!(partition.upcoming[0].id, ids[0]);
        assert_eq!(partition.upcoming[1].id, ids[2]);
        assert_eq!(partition.overdue[0].id, ids[1]);
        assert_eq!(partition.completed[0].id, ids[3]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Completing any number of times leaves the first completion time
        #[test]
        fn prop_completion_idempotent(offsets in prop::collection::vec(0i64..10_000, 1..10)) {
            let start = Utc::now();
            let mut s = schedule(start, false);
            let completions = offsets
                .iter()
                .filter(|offset| s.complete(start + Duration::minutes(**offset)))
                .count();
            prop_assert_eq!(completions, 1);
            prop_assert_eq!(s.completed_at, Some(start + Duration::minutes(offsets[0])));
            prop_assert_eq!(s.status_at(start + Duration::days(365)), RestockStatus::Completed);
        }

        /// Every entry lands in exactly one bucket
        #[test]
        fn prop_partition_is_complete(
            entries in prop::collection::vec((-100i64..100, any::<bool>()), 0..30)
        ) {
            let now = Utc::now();
            let items: Vec<RestockSchedule> = entries
                .iter()
                .map(|(days, done)| schedule(now + Duration::days(*days), *done))
                .collect();
            let total = items.len();
            let partition = partition_schedules(items, now, |s, at| s.status_at(at));
            let (upcoming, overdue, completed) = partition.counts();

            prop_assert_eq!(upcoming + overdue + completed, total);
            prop_assert_eq!(completed, entries.iter().filter(|(_, done)| *done).count());
            prop_assert!(partition.overdue.iter().all(|s| s.scheduled_date < now));
        }
    }
}
