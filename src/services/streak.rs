// SPDX-License-Identifier: MIT

//! Streak tracker: consecutive-day posting counter, correct under
//! concurrent submissions.

use crate::error::{AppError, Result};
use crate::models::StreakState;
use crate::store::{Store, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Conflicts are expected under concurrent same-user submissions, so the
/// tracker absorbs a few before surfacing a retryable error.
const MAX_TXN_ATTEMPTS: u32 = 4;

/// Maintains each user's consecutive-day posting streak.
#[derive(Clone)]
pub struct StreakTracker {
    store: Arc<dyn Store>,
}

impl StreakTracker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a successful post for `user_id` made at `posted_at`.
    ///
    /// Must be called after the post is durably written. Runs one atomic
    /// transaction against the user's streak document, retrying bounded
    /// times on conflict. A failure here never rolls back the post; the
    /// caller logs it and moves on.
    pub async fn record_post(
        &self,
        user_id: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<StreakState> {
        let today = posted_at.date_naive();

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .store
                .transact_streak(user_id, &move |prior| advance_streak(prior, today))
                .await
            {
                Ok(state) => {
                    tracing::info!(
                        user_id,
                        current_streak = state.current_streak,
                        "Streak updated"
                    );
                    return Ok(state);
                }
                Err(StoreError::Conflict) if attempt < MAX_TXN_ATTEMPTS => {
                    tracing::debug!(user_id, attempt, "Streak transaction conflict, retrying");
                }
                Err(StoreError::Conflict) => {
                    tracing::warn!(
                        user_id,
                        attempts = MAX_TXN_ATTEMPTS,
                        "Streak transaction retries exhausted"
                    );
                    return Err(AppError::Contention);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// The transition rule, applied inside the store transaction.
///
/// Day adjacency is calendar-date subtraction, so Dec 31 -> Jan 1 counts as
/// consecutive and two posts 20 hours apart within one calendar day do not
/// advance the streak. A `last_post_date` in the future (clock skew) resets
/// to 1 like any other non-adjacent date.
fn advance_streak(prior: Option<StreakState>, today: NaiveDate) -> StreakState {
    let current_streak = match prior.as_ref().and_then(|s| s.last_post_date) {
        None => 1,
        Some(last) => {
            let streak = prior.as_ref().map(|s| s.current_streak).unwrap_or(0);
            match today.signed_duration_since(last).num_days() {
                0 => streak,
                1 => streak + 1,
                _ => 1,
            }
        }
    };

    StreakState {
        current_streak,
        last_post_date: Some(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(current_streak: u32, last: NaiveDate) -> StreakState {
        StreakState {
            current_streak,
            last_post_date: Some(last),
        }
    }

    #[test]
    fn test_first_post_starts_at_one() {
        let next = advance_streak(None, date(2026, 3, 14));
        assert_eq!(next, state(1, date(2026, 3, 14)));
    }

    #[test]
    fn test_missing_last_date_starts_at_one() {
        // A zeroed document without a date behaves like no prior state.
        let prior = StreakState {
            current_streak: 7,
            last_post_date: None,
        };
        let next = advance_streak(Some(prior), date(2026, 3, 14));
        assert_eq!(next, state(1, date(2026, 3, 14)));
    }

    #[test]
    fn test_same_day_resubmission_does_not_inflate() {
        let next = advance_streak(Some(state(3, date(2026, 3, 14))), date(2026, 3, 14));
        assert_eq!(next, state(3, date(2026, 3, 14)));
    }

    #[test]
    fn test_consecutive_day_increments() {
        let next = advance_streak(Some(state(3, date(2026, 3, 14))), date(2026, 3, 15));
        assert_eq!(next, state(4, date(2026, 3, 15)));
    }

    #[test]
    fn test_gap_resets_to_one() {
        let next = advance_streak(Some(state(5, date(2026, 3, 14))), date(2026, 3, 17));
        assert_eq!(next, state(1, date(2026, 3, 17)));
    }

    #[test]
    fn test_year_boundary_counts_as_consecutive() {
        let next = advance_streak(Some(state(10, date(2025, 12, 31))), date(2026, 1, 1));
        assert_eq!(next, state(11, date(2026, 1, 1)));
    }

    #[test]
    fn test_leap_day_boundary_counts_as_consecutive() {
        let next = advance_streak(Some(state(2, date(2028, 2, 29))), date(2028, 3, 1));
        assert_eq!(next, state(3, date(2028, 3, 1)));
    }

    #[test]
    fn test_future_last_date_resets_to_one() {
        // Clock skew: last post apparently tomorrow.
        let next = advance_streak(Some(state(4, date(2026, 3, 15))), date(2026, 3, 14));
        assert_eq!(next, state(1, date(2026, 3, 14)));
    }

    #[tokio::test]
    async fn test_record_post_retries_through_injected_conflicts() {
        let store = Arc::new(MemoryStore::new());
        store.inject_conflicts(2);

        let tracker = StreakTracker::new(store.clone());
        let posted_at = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();

        let streak = tracker.record_post("u1", posted_at).await.unwrap();
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.last_post_date, Some(date(2026, 3, 14)));
    }

    #[tokio::test]
    async fn test_record_post_surfaces_contention_when_retries_exhausted() {
        let store = Arc::new(MemoryStore::new());
        store.inject_conflicts(100);

        let tracker = StreakTracker::new(store.clone());
        let posted_at = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();

        let err = tracker.record_post("u1", posted_at).await.unwrap_err();
        assert!(matches!(err, AppError::Contention));
    }

    #[tokio::test]
    async fn test_record_post_does_not_retry_unavailable_store() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);

        let tracker = StreakTracker::new(store.clone());
        let posted_at = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();

        let err = tracker.record_post("u1", posted_at).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_midnight_straddle_is_two_days() {
        let store = Arc::new(MemoryStore::new());
        let tracker = StreakTracker::new(store.clone());

        // 23:59 then 00:01 the next day: under 3 minutes apart, still
        // consecutive calendar days.
        let late = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 0).unwrap();
        let early = chrono::Utc.with_ymd_and_hms(2026, 3, 15, 0, 1, 0).unwrap();

        tracker.record_post("u1", late).await.unwrap();
        let streak = tracker.record_post("u1", early).await.unwrap();
        assert_eq!(streak.current_streak, 2);
    }
}
