//! Food lookups: local catalogue, remote FDC database and the lookup cache.

mod cache;
mod catalog;
mod normalize;
mod provider;

pub use cache::FoodCache;
pub use catalog::LocalCatalog;
pub use normalize::{FoodRef, REMOTE_ID_PREFIX, normalize, remote_id};
pub use provider::FoodProvider;
