// SPDX-License-Identifier: MIT

//! Per-user streak state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive-day posting streak, one document per user in the
/// `streaks` collection, keyed by user ID.
///
/// Owned exclusively by the streak tracker and only ever mutated inside
/// a single atomic transaction per update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Number of consecutive calendar days with at least one post
    pub current_streak: u32,
    /// Calendar day of the most recent post, if any
    pub last_post_date: Option<NaiveDate>,
}
