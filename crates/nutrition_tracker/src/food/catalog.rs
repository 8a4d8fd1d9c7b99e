use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::normalize::REMOTE_ID_PREFIX;
use crate::models::Food;
use crate::nutrition::NutritionTotals;
use crate::store::{StoreError, write_json_atomic};

/// Locally maintained foods, addressed by their own ids (`f1`, `f2`, ...).
///
/// A catalogue opened from a file writes every added food back to it.
#[derive(Clone, Debug, Default)]
pub struct LocalCatalog {
    foods: Arc<RwLock<Vec<Food>>>,
    path: Option<PathBuf>,
}

impl LocalCatalog {
    /// Load the catalogue file, writing the seed list first if it is missing.
    ///
    /// Entries whose id carries the remote prefix are skipped with a warning.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let foods = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let foods = seed_foods();
                write_json_atomic(path, &foods).await?;
                foods
            }
            Err(e) => return Err(e.into()),
        };
        let foods = local_only(foods);
        tracing::debug!(path = %path.display(), foods = foods.len(), "food catalogue loaded");
        Ok(Self {
            foods: Arc::new(RwLock::new(foods)),
            path: Some(path.to_path_buf()),
        })
    }

    /// A catalogue that lives only in memory; added foods are not written anywhere.
    pub fn in_memory(foods: Vec<Food>) -> Self {
        Self {
            foods: Arc::new(RwLock::new(local_only(foods))),
            path: None,
        }
    }

    pub fn seeded() -> Self {
        Self::in_memory(seed_foods())
    }

    pub async fn get(&self, id: &str) -> Option<Food> {
        self.foods.read().await.iter().find(|f| f.id == id).cloned()
    }

    /// Case-insensitive substring match on the name, in catalogue order.
    pub async fn search(&self, query: &str) -> Vec<Food> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.foods
            .read()
            .await
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Append a manually entered food under the next free `f<n>` id.
    ///
    /// For a file-backed catalogue the food is only kept if the file write
    /// succeeds.
    pub async fn add(&self, name: &str, per_100g: NutritionTotals) -> Result<Food, StoreError> {
        let mut foods = self.foods.write().await;
        let food = Food {
            id: next_id(&foods),
            name: name.trim().to_string(),
            calories: per_100g.calories,
            protein: per_100g.protein,
            carbs: per_100g.carbs,
            fat: per_100g.fat,
            fiber: per_100g.fiber,
        };
        foods.push(food.clone());
        if let Some(path) = &self.path {
            if let Err(e) = write_json_atomic(path, foods.as_slice()).await {
                foods.pop();
                return Err(e);
            }
        }
        tracing::info!(food_id = %food.id, name = %food.name, "food added to catalogue");
        Ok(food)
    }

    pub async fn len(&self) -> usize {
        self.foods.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.foods.read().await.is_empty()
    }
}

fn local_only(mut foods: Vec<Food>) -> Vec<Food> {
    foods.retain(|food| {
        let remote = food.id.starts_with(REMOTE_ID_PREFIX);
        if remote {
            tracing::warn!(food_id = %food.id, "catalogue entry uses the remote id prefix, skipped");
        }
        !remote
    });
    foods
}

/// One past the highest numeric `f<n>` id, and never below the entry count.
fn next_id(foods: &[Food]) -> String {
    let highest = foods
        .iter()
        .filter_map(|f| f.id.strip_prefix('f')?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("f{}", highest.max(foods.len() as u64) + 1)
}

fn seed_foods() -> Vec<Food> {
    let food = |id: &str, name: &str, calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64| Food {
        id: id.into(),
        name: name.into(),
        calories,
        protein,
        carbs,
        fat,
        fiber,
    };
    vec![
        food("f1", "Chicken Breast", 165.0, 31.0, 0.0, 3.6, 0.0),
        food("f2", "Oatmeal", 367.0, 13.5, 68.0, 7.0, 10.5),
        food("f3", "Banana", 89.0, 1.1, 22.8, 0.3, 2.6),
        food("f4", "Egg", 155.0, 12.6, 1.1, 11.3, 0.0),
        food("f5", "Salmon", 208.0, 22.0, 0.0, 13.0, 0.0),
    ]
}
