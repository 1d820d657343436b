// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod post;
pub mod prompt;
pub mod streak;
pub mod user;

pub use post::Post;
pub use prompt::{DailyPrompt, PromptType};
pub use streak::StreakState;
pub use user::User;
