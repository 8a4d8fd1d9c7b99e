//! Mock `FdcClient` and fixtures shared by the unit tests.
#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fdc_client::{FdcClient, FdcError, FdcFood, FdcNutrient};

/// In-memory FDC database. Search is a case-insensitive substring match on
/// the description; unknown ids are `NotFound`.
#[derive(Default)]
pub struct MockFdc {
    foods: Vec<FdcFood>,
    delay: Option<Duration>,
    failure: Option<Box<dyn Fn() -> FdcError + Send + Sync>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl MockFdc {
    pub fn with_food(mut self, food: FdcFood) -> Self {
        self.foods.push(food);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call fails with the error built by `make`.
    pub fn failing(mut self, make: impl Fn() -> FdcError + Send + Sync + 'static) -> Self {
        self.failure = Some(Box::new(make));
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl FdcClient for MockFdc {
    async fn search_foods(&self, query: &str, page_size: u32) -> Result<Vec<FdcFood>, FdcError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(make) = &self.failure {
            return Err(make());
        }
        let needle = query.to_lowercase();
        Ok(self
            .foods
            .iter()
            .filter(|f| f.description.to_lowercase().contains(&needle))
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn get_food(&self, fdc_id: u64) -> Result<FdcFood, FdcError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(make) = &self.failure {
            return Err(make());
        }
        self.foods
            .iter()
            .find(|f| f.fdc_id == fdc_id)
            .cloned()
            .ok_or_else(|| FdcError::NotFound(format!("fdc id {fdc_id}")))
    }
}

/// Search-shaped FDC record with energy and protein only.
pub fn fdc_food(fdc_id: u64, description: &str, kcal: f64, protein: f64) -> FdcFood {
    let nutrient = |number: &str, name: &str, unit: &str, value: f64| FdcNutrient {
        nutrient_number: Some(number.into()),
        nutrient_name: Some(name.into()),
        value: Some(value),
        unit_name: Some(unit.into()),
        ..FdcNutrient::default()
    };
    FdcFood {
        fdc_id,
        description: description.into(),
        data_type: Some("SR Legacy".into()),
        food_nutrients: vec![
            nutrient("208", "Energy", "KCAL", kcal),
            nutrient("203", "Protein", "G", protein),
        ],
    }
}
