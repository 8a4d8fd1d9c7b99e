//! Personal nutrition tracker.
//!
//! A [`CommandServer`] owns the profile and daily logs and answers typed
//! requests from any number of [`ServerHandle`]s. Food lookups go through
//! [`FoodProvider`], which caches remote FoodData Central records.

pub mod clock;
pub mod config;
pub mod error;
pub mod food;
pub mod frontend;
pub mod models;
pub mod nutrition;
pub mod server;
pub mod store;

mod test_utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CommandError, CommandResult, ErrorKind};
pub use food::{FoodCache, FoodProvider, LocalCatalog};
pub use models::{ConsumedFoodEntry, DailyLog, Food, Gender, Meal, UserProfile};
pub use nutrition::NutritionTotals;
pub use server::{CommandServer, Request, RequestKind, Response, ResponseData, ServerHandle};
pub use store::{JsonFileStore, MemoryStore, SqliteStore, StateStore, StoreError};
