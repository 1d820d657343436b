// SPDX-License-Identifier: MIT

//! In-memory store for tests and local development.
//!
//! Backed by dashmap; `transact_streak` is linearizable per user because the
//! map's entry lock is held for the whole read-compute-write. Failure
//! injection hooks let tests exercise the conflict-retry and store-failure
//! paths without a real backend.

use crate::models::{DailyPrompt, Post, StreakState, User};
use crate::store::{
    PostStore, PromptStore, StoreError, StoreResult, StreakStore, StreakUpdateFn, UserStore,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// In-process document store.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    prompts: DashMap<String, DailyPrompt>,
    posts: DashMap<String, Post>,
    streaks: DashMap<String, StreakState>,

    // Failure injection for tests
    offline: AtomicBool,
    fail_listings: AtomicBool,
    conflicts_to_inject: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make only listing queries fail, leaving existence probes working.
    pub fn set_fail_listings(&self, fail: bool) {
        self.fail_listings.store(fail, Ordering::SeqCst);
    }

    /// Make the next `n` streak transactions fail with a conflict.
    pub fn inject_conflicts(&self, n: u32) {
        self.conflicts_to_inject.store(n, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline (injected)".into()));
        }
        Ok(())
    }

    fn take_injected_conflict(&self) -> bool {
        self.conflicts_to_inject
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        self.check_online()?;
        self.posts.insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn user_posted_on(&self, user_id: &str, date: NaiveDate) -> StoreResult<bool> {
        self.check_online()?;
        Ok(self
            .posts
            .iter()
            .any(|p| p.user_id == user_id && p.post_date == date))
    }

    async fn posts_for_date(&self, date: NaiveDate) -> StoreResult<Vec<Post>> {
        self.check_online()?;
        if self.fail_listings.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("listing failed (injected)".into()));
        }

        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.post_date == date)
            .map(|p| p.clone())
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn posts_for_user(&self, user_id: &str) -> StoreResult<Vec<Post>> {
        self.check_online()?;
        if self.fail_listings.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("listing failed (injected)".into()));
        }

        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.clone())
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }
}

#[async_trait]
impl StreakStore for MemoryStore {
    async fn streak_for_user(&self, user_id: &str) -> StoreResult<Option<StreakState>> {
        self.check_online()?;
        Ok(self.streaks.get(user_id).map(|s| s.clone()))
    }

    async fn transact_streak(
        &self,
        user_id: &str,
        update: &StreakUpdateFn,
    ) -> StoreResult<StreakState> {
        self.check_online()?;
        if self.take_injected_conflict() {
            return Err(StoreError::Conflict);
        }

        // The entry lock serializes transactions per user.
        let next = match self.streaks.entry(user_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                let next = update(Some(occupied.get().clone()));
                occupied.insert(next.clone());
                next
            }
            Entry::Vacant(vacant) => {
                let next = update(None);
                vacant.insert(next.clone());
                next
            }
        };

        Ok(next)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, uid: &str) -> StoreResult<Option<User>> {
        self.check_online()?;
        Ok(self.users.get(uid).map(|u| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_online()?;
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn upsert_user(&self, user: &User) -> StoreResult<()> {
        self.check_online()?;
        self.users.insert(user.uid.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl PromptStore for MemoryStore {
    async fn get_prompt(&self, prompt_id: &str) -> StoreResult<Option<DailyPrompt>> {
        self.check_online()?;
        Ok(self.prompts.get(prompt_id).map(|p| p.clone()))
    }

    async fn prompt_for_date(&self, date: NaiveDate) -> StoreResult<Option<DailyPrompt>> {
        self.check_online()?;
        Ok(self
            .prompts
            .iter()
            .find(|p| p.date == date)
            .map(|p| p.clone()))
    }

    async fn list_prompts(&self) -> StoreResult<Vec<DailyPrompt>> {
        self.check_online()?;
        Ok(self.prompts.iter().map(|p| p.clone()).collect())
    }

    async fn upsert_prompt(&self, prompt: &DailyPrompt) -> StoreResult<()> {
        self.check_online()?;
        self.prompts.insert(prompt.id.clone(), prompt.clone());
        Ok(())
    }
}
