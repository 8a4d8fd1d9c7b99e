use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{StateStore, StoreError};
use crate::models::{DailyLog, Gender, Meal, UserProfile, date_key};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        age INTEGER NOT NULL,
        weight REAL NOT NULL,
        height REAL NOT NULL,
        gender TEXT NOT NULL,
        goal TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS daily_logs (
        date TEXT PRIMARY KEY,
        meals TEXT NOT NULL
    )",
];

/// SQLite-backed store. The profile is a singleton row; each daily log is one
/// row holding its meals as JSON.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        Self::connect_with(options).await
    }

    /// Private database that lives as long as the store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        // A single long-lived connection: writes are serialized and an
        // in-memory database is never dropped by the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn get_user(&self) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query(
            "SELECT first_name, last_name, age, weight, height, gender, goal
             FROM users WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let age: i64 = row.try_get("age")?;
        let gender: String = row.try_get("gender")?;
        Ok(Some(UserProfile {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            age: u32::try_from(age).map_err(|_| StoreError::Corrupt(format!("age {age}")))?,
            weight_kg: row.try_get("weight")?,
            height_cm: row.try_get("height")?,
            gender: Gender::from(gender),
            goal: row.try_get("goal")?,
        }))
    }

    async fn save_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, age, weight, height, gender, goal)
             VALUES (1, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                age = excluded.age,
                weight = excluded.weight,
                height = excluded.height,
                gender = excluded.gender,
                goal = excluded.goal",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(i64::from(user.age))
        .bind(user.weight_kg)
        .bind(user.height_cm)
        .bind(user.gender.to_string())
        .bind(&user.goal)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_daily_log(&self, date: NaiveDate) -> Result<DailyLog, StoreError> {
        let meals: Option<String> = sqlx::query_scalar("SELECT meals FROM daily_logs WHERE date = ?")
            .bind(date_key(date))
            .fetch_optional(&self.pool)
            .await?;

        match meals {
            None => Ok(DailyLog::empty(date)),
            Some(json) => {
                let meals: Vec<Meal> = serde_json::from_str(&json)?;
                Ok(DailyLog { date, meals })
            }
        }
    }

    async fn save_daily_log(&self, log: &DailyLog) -> Result<(), StoreError> {
        let meals = serde_json::to_string(&log.meals)?;
        sqlx::query(
            "INSERT INTO daily_logs (date, meals) VALUES (?, ?)
             ON CONFLICT(date) DO UPDATE SET meals = excluded.meals",
        )
        .bind(log.date_key())
        .bind(meals)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
