use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use fdc_client::FdcError;
use thiserror::Error;

use crate::store::{JsonFileStore, MemoryStore, SqliteStore, StateStore, StoreError};

pub const DATA_DIR_NAME: &str = ".nutritionapp";
pub const USER_FILE: &str = "user.json";
pub const DATABASE_FILE: &str = "nutrition.db";
pub const FOODS_FILE: &str = "foods.json";

/// Appended to the log filter so dependency internals stay quiet by default.
const LOG_TARGET_OVERRIDES: &str = "sqlx=warn,reqwest=warn,hyper=warn,hyper_util=warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    Fdc(#[from] FdcError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Json,
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "sqlite" | "sql" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid {
                key: "NUTRITION_STORE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub store: StoreBackend,
    pub fdc: fdc_client::config::Config,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads through `get`, so tests need
    /// not touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let data_dir = match get("NUTRITION_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => get("HOME")
                .filter(|v| !v.trim().is_empty())
                .map(|home| PathBuf::from(home).join(DATA_DIR_NAME))
                .ok_or(ConfigError::Missing("NUTRITION_DATA_DIR or HOME"))?,
        };
        let store = match get("NUTRITION_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::default(),
        };
        let fdc = fdc_client::config::Config::from_env_with(&mut get)?;
        Ok(Self {
            data_dir,
            store,
            fdc,
        })
    }

    pub fn user_file(&self) -> PathBuf {
        self.data_dir.join(USER_FILE)
    }

    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn foods_file(&self) -> PathBuf {
        self.data_dir.join(FOODS_FILE)
    }

    pub async fn open_store(&self) -> Result<Arc<dyn StateStore>, StoreError> {
        let store: Arc<dyn StateStore> = match self.store {
            StoreBackend::Json => Arc::new(JsonFileStore::open(self.user_file()).await?),
            StoreBackend::Sqlite => {
                tokio::fs::create_dir_all(&self.data_dir).await?;
                Arc::new(SqliteStore::open(self.database_file()).await?)
            }
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        tracing::info!(backend = ?self.store, data_dir = %self.data_dir.display(), "state store ready");
        Ok(store)
    }
}

/// Tracing filter from `NUTRITION_LOG_LEVEL`, then `RUST_LOG`, else `info`.
/// Returns the base level and the full directive string.
pub fn log_filter_with<F>(mut get: F) -> (String, String)
where
    F: FnMut(&str) -> Option<String>,
{
    let level = get("NUTRITION_LOG_LEVEL")
        .or_else(|| get("RUST_LOG"))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    let directives = format!("{level},{LOG_TARGET_OVERRIDES}");
    (level, directives)
}
