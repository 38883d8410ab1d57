//! Restock planning models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A planned reorder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RestockSchedule {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub quantity: Decimal,
    pub unit: String,
    pub notes: Option<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RestockSchedule {
    pub fn status_at(&self, now: DateTime<Utc>) -> RestockStatus {
        classify_schedule(self.completed, self.scheduled_date, now)
    }

    /// Mark as completed; a second call keeps the first completion time
    ///
    /// Returns whether this call did the completing.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(now);
        true
    }
}

/// Display bucket of a schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestockStatus {
    Upcoming,
    Overdue,
    Completed,
}

/// Overdue entries stay overdue until completed or deleted
pub fn classify_schedule(
    completed: bool,
    scheduled_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> RestockStatus {
    if completed {
        RestockStatus::Completed
    } else if scheduled_date >= now {
        RestockStatus::Upcoming
    } else {
        RestockStatus::Overdue
    }
}

/// Schedules grouped for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockPartition<T> {
    pub upcoming: Vec<T>,
    pub overdue: Vec<T>,
    pub completed: Vec<T>,
}

impl<T> Default for RestockPartition<T> {
    fn default() -> Self {
        Self {
            upcoming: Vec::new(),
            overdue: Vec::new(),
            completed: Vec::new(),
        }
    }
}

impl<T> RestockPartition<T> {
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.upcoming.len(), self.overdue.len(), self.completed.len())
    }
}

/// Split entries into upcoming/overdue/completed, preserving input order
pub fn partition_schedules<T, F>(
    items: impl IntoIterator<Item = T>,
    now: DateTime<Utc>,
    status_of: F,
) -> RestockPartition<T>
where
    F: Fn(&T, DateTime<Utc>) -> RestockStatus,
{
    let mut partition = RestockPartition::default();
    for item in items {
        match status_of(&item, now) {
            RestockStatus::Upcoming => partition.upcoming.push(item),
            RestockStatus::Overdue => partition.overdue.push(item),
            RestockStatus::Completed => partition.completed.push(item),
        }
    }
    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn schedule(offset_days: i64, completed: bool, now: DateTime<Utc>) -> RestockSchedule {
        RestockSchedule {
            id: Uuid::new_v4(),
            ingredient_id: Uuid::new_v4(),
            scheduled_date: now + Duration::days(offset_days),
            quantity: Decimal::from(6),
            unit: "bottle".to_string(),
            notes: None,
            completed,
            completed_at: None,
        }
    }

    #[test]
    fn test_partition() {
        let now = Utc::now();
        let items = vec![
            schedule(2, false, now),
            schedule(-1, false, now),
            schedule(-5, true, now),
            schedule(0, false, now),
        ];
        let p = partition_schedules(items, now, |s, n| s.status_at(n));
        assert_eq!(p.counts(), (2, 1, 1));
    }

    #[test]
    fn test_completion_is_idempotent() {
        let now = Utc::now();
        let mut s = schedule(1, false, now);
        assert!(s.complete(now));
        let first = s.completed_at;
        assert!(!s.complete(now + Duration::hours(3)));
        assert!(s.completed);
        assert_eq!(s.completed_at, first);
    }

    #[test]
    fn test_overdue_never_self_heals() {
        let now = Utc::now();
        let s = schedule(-30, false, now);
        assert_eq!(s.status_at(now), RestockStatus::Overdue);
        assert_eq!(s.status_at(now + Duration::days(365)), RestockStatus::Overdue);
    }
}
