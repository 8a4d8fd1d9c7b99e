use std::sync::Arc;

use fdc_client::FdcClient;

use super::cache::FoodCache;
use super::catalog::LocalCatalog;
use super::normalize::{FoodRef, normalize};
use crate::error::{CommandError, CommandResult};
use crate::models::Food;
use crate::nutrition::NutritionTotals;

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Food lookups over the local catalogue and the remote FDC database.
///
/// Remote results pass through [`FoodCache`]; local foods are never cached.
pub struct FoodProvider {
    client: Arc<dyn FdcClient>,
    cache: FoodCache,
    catalog: LocalCatalog,
    page_size: u32,
}

impl FoodProvider {
    pub fn new(client: Arc<dyn FdcClient>, catalog: LocalCatalog) -> Self {
        Self {
            client,
            cache: FoodCache::new(),
            catalog,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn cache(&self) -> &FoodCache {
        &self.cache
    }

    pub fn catalog(&self) -> &LocalCatalog {
        &self.catalog
    }

    /// Local matches first, then normalized remote hits.
    pub async fn search_foods(&self, query: &str) -> CommandResult<Vec<Food>> {
        let mut foods = self.catalog.search(query).await;

        let hits = self.client.search_foods(query, self.page_size).await?;
        for raw in &hits {
            let food = normalize(raw);
            self.cache.put(food.id.clone(), food.clone()).await;
            foods.push(food);
        }
        Ok(foods)
    }

    pub async fn get_food_details(&self, id: &str) -> CommandResult<Food> {
        match FoodRef::parse(id) {
            FoodRef::Local(local) => self
                .catalog
                .get(local)
                .await
                .ok_or_else(|| CommandError::NotFound(format!("food {local}"))),
            FoodRef::MalformedRemote => Err(CommandError::NotFound(format!("food {id}"))),
            FoodRef::Remote(fdc_id) => {
                if let Some(food) = self.cache.get(id).await {
                    tracing::debug!(food_id = id, "food cache hit");
                    return Ok(food);
                }
                self.cache
                    .get_or_try_insert_with(id, || async {
                        tracing::debug!(food_id = id, "food cache miss");
                        let raw = self.client.get_food(fdc_id).await?;
                        let mut food = normalize(&raw);
                        food.id = id.to_string();
                        Ok::<_, CommandError>(food)
                    })
                    .await
            }
        }
    }

    /// Record a manually entered food in the local catalogue.
    pub async fn add_local_food(&self, name: &str, per_100g: NutritionTotals) -> CommandResult<Food> {
        Ok(self.catalog.add(name, per_100g).await?)
    }
}

impl std::fmt::Debug for FoodProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodProvider")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
