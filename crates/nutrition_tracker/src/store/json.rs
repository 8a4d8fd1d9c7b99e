use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{StateStore, StoreError};
use crate::models::{DailyLog, UserProfile, date_key};

/// On-disk layout: the profile plus logs keyed by `YYYY-MM-DD`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    user: Option<UserProfile>,
    #[serde(default)]
    daily_logs: BTreeMap<String, DailyLog>,
}

/// Flat-file store holding the whole state in one JSON document.
///
/// The document is kept in memory behind a mutex and rewritten on each save
/// (temp file + rename). A failed write leaves memory unchanged.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl JsonFileStore {
    /// Open the document at `path`, creating it (and its directory) if missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let doc = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let doc = Document::default();
                write_document(&path, &doc).await?;
                doc
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "json store opened");

        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn write_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    write_json_atomic(path, doc).await
}

/// Pretty-print `value` to `<path>.tmp`, then rename it over `path`.
pub(crate) async fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn get_user(&self) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.doc.lock().await.user.clone())
    }

    async fn save_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        let mut doc = self.doc.lock().await;
        let previous = doc.user.replace(user.clone());
        if let Err(e) = write_document(&self.path, &doc).await {
            doc.user = previous;
            return Err(e);
        }
        Ok(())
    }

    async fn get_daily_log(&self, date: NaiveDate) -> Result<DailyLog, StoreError> {
        let doc = self.doc.lock().await;
        Ok(doc
            .daily_logs
            .get(&date_key(date))
            .cloned()
            .unwrap_or_else(|| DailyLog::empty(date)))
    }

    async fn save_daily_log(&self, log: &DailyLog) -> Result<(), StoreError> {
        let mut doc = self.doc.lock().await;
        let key = log.date_key();
        let previous = doc.daily_logs.insert(key.clone(), log.clone());
        if let Err(e) = write_document(&self.path, &doc).await {
            match previous {
                Some(old) => doc.daily_logs.insert(key, old),
                None => doc.daily_logs.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsumedFoodEntry, Food, Gender, Meal};
    use chrono::Utc;

    fn profile() -> UserProfile {
        UserProfile {
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            age: 36,
            weight_kg: 60.0,
            height_cm: 165.0,
            gender: Gender::Female,
            goal: "maintenance".into(),
        }
    }

    #[tokio::test]
    async fn creates_file_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("user.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(path.exists());
        assert!(store.get_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.save_user(&profile()).await.unwrap();
            let mut log = store.get_daily_log(day).await.unwrap();
            let mut meal = Meal::new("lunch", Utc::now());
            meal.entries.push(ConsumedFoodEntry {
                food: Food {
                    id: "f3".into(),
                    name: "Banana".into(),
                    calories: 89.0,
                    protein: 1.1,
                    carbs: 22.8,
                    fat: 0.3,
                    fiber: 2.6,
                },
                quantity_g: 120.0,
            });
            log.meals.push(meal);
            store.save_daily_log(&log).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_user().await.unwrap(), Some(profile()));
        let log = reopened.get_daily_log(day).await.unwrap();
        assert_eq!(log.meals.len(), 1);
        assert!((log.totals().calories - 106.8).abs() < 1e-9);

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains("\"2025-06-02\""));
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = JsonFileStore::open(data_dir.join("user.json")).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();

        let mut log = store.get_daily_log(day).await.unwrap();
        log.meals.push(Meal::new("breakfast", Utc::now()));
        store.save_daily_log(&log).await.unwrap();

        // With the directory gone the temp file cannot be created.
        tokio::fs::remove_dir_all(&data_dir).await.unwrap();

        log.meals.push(Meal::new("lunch", Utc::now()));
        let err = store.save_daily_log(&log).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)), "{err}");
        let kept = store.get_daily_log(day).await.unwrap();
        assert_eq!(kept.meals.len(), 1);
        assert_eq!(kept.meals[0].name, "breakfast");

        let other_day = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let mut fresh = store.get_daily_log(other_day).await.unwrap();
        fresh.meals.push(Meal::new("snack", Utc::now()));
        assert!(store.save_daily_log(&fresh).await.is_err());
        assert!(store.get_daily_log(other_day).await.unwrap().meals.is_empty());

        assert!(store.save_user(&profile()).await.is_err());
        assert!(store.get_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
