use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};

use crate::models::Food;

/// Memoized remote food lookups keyed by remote id.
///
/// Each id owns a `OnceCell`: concurrent misses for the same id wait on one
/// initialization, and a reader only ever sees a fully built [`Food`]. A failed
/// initialization leaves the cell empty, which reads as absent.
///
/// Unbounded: there is no eviction.
#[derive(Debug, Default)]
pub struct FoodCache {
    entries: RwLock<HashMap<String, Arc<OnceCell<Food>>>>,
}

impl FoodCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<Food> {
        let entries = self.entries.read().await;
        entries.get(id).and_then(|cell| cell.get().cloned())
    }

    /// Last write wins.
    pub async fn put(&self, id: impl Into<String>, food: Food) {
        let cell = Arc::new(OnceCell::new_with(Some(food)));
        self.entries.write().await.insert(id.into(), cell);
    }

    /// Number of ids with a cached food.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Cached food for `id`, or the result of `fetch`.
    ///
    /// At most one `fetch` runs per id at a time; callers arriving while it
    /// runs wait for its outcome. On error nothing is cached, the empty slot
    /// is released and the next caller fetches again.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, id: &str, fetch: F) -> Result<Food, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Food, E>>,
    {
        let cell = self.cell(id).await;
        match cell.get_or_try_init(fetch).await {
            Ok(food) => Ok(food.clone()),
            Err(e) => {
                let mut entries = self.entries.write().await;
                let stale = entries
                    .get(id)
                    .is_some_and(|slot| Arc::ptr_eq(slot, &cell) && !slot.initialized());
                if stale {
                    entries.remove(id);
                }
                Err(e)
            }
        }
    }

    async fn cell(&self, id: &str) -> Arc<OnceCell<Food>> {
        if let Some(cell) = self.entries.read().await.get(id) {
            return Arc::clone(cell);
        }
        let mut entries = self.entries.write().await;
        Arc::clone(entries.entry(id.to_string()).or_default())
    }
}
