//! Persistence boundary for the profile and the per-day logs.
//!
//! Adapters:
//! - [`JsonFileStore`]: one JSON document on disk
//! - [`SqliteStore`]: SQLite through sqlx
//! - [`MemoryStore`]: process-local, for tests and throwaway sessions
//!
//! Every adapter serializes its own read-modify-write sequences.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{DailyLog, UserProfile};

mod json;
mod memory;
mod sqlite;

pub use json::JsonFileStore;
pub(crate) use json::write_json_atomic;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    async fn get_user(&self) -> Result<Option<UserProfile>, StoreError>;

    async fn save_user(&self, user: &UserProfile) -> Result<(), StoreError>;

    /// Log for `date`, or an empty one if nothing was saved for that day.
    /// An empty log is not persisted until it is saved.
    async fn get_daily_log(&self, date: NaiveDate) -> Result<DailyLog, StoreError>;

    async fn save_daily_log(&self, log: &DailyLog) -> Result<(), StoreError>;
}
