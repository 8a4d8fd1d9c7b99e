use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::{StateStore, StoreError};
use crate::models::{DailyLog, UserProfile};

#[derive(Debug, Default)]
struct Inner {
    user: Option<UserProfile>,
    daily_logs: HashMap<NaiveDate, DailyLog>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get_user(&self) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.inner.lock().await.user.clone())
    }

    async fn save_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        self.inner.lock().await.user = Some(user.clone());
        Ok(())
    }

    async fn get_daily_log(&self, date: NaiveDate) -> Result<DailyLog, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .daily_logs
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DailyLog::empty(date)))
    }

    async fn save_daily_log(&self, log: &DailyLog) -> Result<(), StoreError> {
        self.inner
            .lock()
            .await
            .daily_logs
            .insert(log.date, log.clone());
        Ok(())
    }
}
