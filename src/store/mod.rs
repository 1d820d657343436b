//! Document-store abstraction.
//!
//! The core decision logic (feed gate, streak tracker) only ever talks to
//! these traits, so it runs unchanged against Firestore in production and
//! against the in-memory store in tests and local development.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::models::{DailyPrompt, Post, StreakState, User};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROMPTS: &str = "prompts";
    pub const POSTS: &str = "posts";
    /// Per-user streak state (keyed by uid)
    pub const STREAKS: &str = "streaks";
}

/// Errors surfaced by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the operation failed outright.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A concurrent writer invalidated an atomic transaction.
    /// Retryable; the streak tracker retries these a bounded number of times.
    #[error("transaction conflict")]
    Conflict,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Pure function applied to the current streak state inside a transaction.
pub type StreakUpdateFn = dyn Fn(Option<StreakState>) -> StreakState + Send + Sync;

/// Post storage: append-only records grouped by calendar date.
#[async_trait]
pub trait PostStore {
    /// Store a new post. Posts use writer-chosen UUIDs, so no locking is needed.
    async fn insert_post(&self, post: &Post) -> StoreResult<()>;

    /// Existence probe with limit-1 semantics: has this user posted on `date`?
    async fn user_posted_on(&self, user_id: &str, date: NaiveDate) -> StoreResult<bool>;

    /// All posts for `date` across all users, newest first.
    async fn posts_for_date(&self, date: NaiveDate) -> StoreResult<Vec<Post>>;

    /// All posts by one user, newest first.
    async fn posts_for_user(&self, user_id: &str) -> StoreResult<Vec<Post>>;
}

/// Streak storage: one mutable document per user, updated transactionally.
#[async_trait]
pub trait StreakStore {
    async fn streak_for_user(&self, user_id: &str) -> StoreResult<Option<StreakState>>;

    /// Apply `update` to the user's streak state inside a single atomic
    /// transaction: read, compute, write, with isolation against concurrent
    /// transactions on the same key. Returns the state that was written.
    ///
    /// `update` must be a pure function of its input; the store may invoke
    /// it more than once if the underlying transaction is restarted.
    async fn transact_streak(
        &self,
        user_id: &str,
        update: &StreakUpdateFn,
    ) -> StoreResult<StreakState>;
}

/// User account storage.
#[async_trait]
pub trait UserStore {
    async fn get_user(&self, uid: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn upsert_user(&self, user: &User) -> StoreResult<()>;
}

/// Prompt storage.
#[async_trait]
pub trait PromptStore {
    async fn get_prompt(&self, prompt_id: &str) -> StoreResult<Option<DailyPrompt>>;
    async fn prompt_for_date(&self, date: NaiveDate) -> StoreResult<Option<DailyPrompt>>;
    async fn list_prompts(&self) -> StoreResult<Vec<DailyPrompt>>;
    async fn upsert_prompt(&self, prompt: &DailyPrompt) -> StoreResult<()>;
}

/// The full store surface the application is wired against.
pub trait Store: PostStore + StreakStore + UserStore + PromptStore + Send + Sync {}

impl<T> Store for T where T: PostStore + StreakStore + UserStore + PromptStore + Send + Sync {}
