// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod feed_gate;
pub mod streak;
pub mod submission;

pub use feed_gate::{FeedGate, FeedState};
pub use streak::StreakTracker;
pub use submission::{NewPost, Submission, SubmissionService};
