#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use fdc_client::{FdcClient, FdcError, FdcFood};
use nutrition_tracker::{
    CommandServer, DailyLog, FoodProvider, LocalCatalog, ManualClock, MemoryStore, ServerHandle,
    StateStore, StoreError, UserProfile,
};
use serde_json::json;
use tokio::task::JoinHandle;

/// Stand-in for FoodData Central that serves a fixed list of records.
#[derive(Default)]
pub struct StaticFdc {
    pub foods: Vec<FdcFood>,
    pub delay: Option<Duration>,
    /// Search panics instead of answering.
    pub panic_on_search: bool,
    pub detail_calls: AtomicUsize,
}

impl StaticFdc {
    pub fn new(foods: Vec<FdcFood>) -> Self {
        Self {
            foods,
            ..Self::default()
        }
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FdcClient for StaticFdc {
    async fn search_foods(&self, query: &str, _page_size: u32) -> Result<Vec<FdcFood>, FdcError> {
        if self.panic_on_search {
            panic!("search index corrupted");
        }
        let needle = query.to_lowercase();
        Ok(self
            .foods
            .iter()
            .filter(|f| f.description.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn get_food(&self, fdc_id: u64) -> Result<FdcFood, FdcError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.foods
            .iter()
            .find(|f| f.fdc_id == fdc_id)
            .cloned()
            .ok_or_else(|| FdcError::NotFound(fdc_id.to_string()))
    }
}

/// Memory-backed store whose daily-log writes fail while `failing` is set.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub failing: AtomicBool,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn get_user(&self) -> Result<Option<UserProfile>, StoreError> {
        self.inner.get_user().await
    }

    async fn save_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        self.inner.save_user(user).await
    }

    async fn get_daily_log(&self, date: NaiveDate) -> Result<DailyLog, StoreError> {
        self.inner.get_daily_log(date).await
    }

    async fn save_daily_log(&self, log: &DailyLog) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save_daily_log(log).await
    }
}

pub fn fdc_record(fdc_id: u64, description: &str, kcal: f64, protein: f64) -> FdcFood {
    serde_json::from_value(json!({
        "fdcId": fdc_id,
        "description": description,
        "dataType": "SR Legacy",
        "foodNutrients": [
            {"nutrientNumber": "208", "nutrientName": "Energy", "unitName": "KCAL", "value": kcal},
            {"nutrientNumber": "203", "nutrientName": "Protein", "unitName": "G", "value": protein}
        ]
    }))
    .expect("valid fdc record")
}

pub struct Harness {
    pub handle: ServerHandle,
    pub server: JoinHandle<()>,
    pub clock: ManualClock,
    pub fdc: Arc<StaticFdc>,
}

pub fn start_with(store: Arc<dyn StateStore>, fdc: StaticFdc) -> Harness {
    let fdc = Arc::new(fdc);
    let client: Arc<dyn FdcClient> = fdc.clone();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap());
    let foods = FoodProvider::new(client, LocalCatalog::seeded());
    let (handle, server) = CommandServer::spawn(store, Arc::new(foods), Arc::new(clock.clone()));
    Harness {
        handle,
        server,
        clock,
        fdc,
    }
}

pub fn start(fdc: StaticFdc) -> Harness {
    start_with(Arc::new(MemoryStore::new()), fdc)
}
