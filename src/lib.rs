// SPDX-License-Identifier: MIT

//! OnCue: answer the daily prompt, unlock your friends' feed.
//!
//! This crate is the backend API for the OnCue mobile app. Users respond to
//! a daily prompt and the shared feed for a day stays locked until they have
//! posted their own response. Streaks count consecutive posting days.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use services::{FeedGate, StreakTracker, SubmissionService};
use std::sync::Arc;
use store::Store;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub feed_gate: FeedGate,
    pub streaks: StreakTracker,
    pub submissions: SubmissionService,
}

impl AppState {
    /// Wire the services against a store implementation.
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let streaks = StreakTracker::new(store.clone());
        Self {
            feed_gate: FeedGate::new(store.clone()),
            submissions: SubmissionService::new(store.clone(), streaks.clone()),
            streaks,
            store,
            config,
        }
    }
}
