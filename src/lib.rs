//! Unified Cache - one cache contract over local and remote stores
//!
//! A capacity-bounded, TTL-expiring LRU engine plus Redis and Memcached
//! adapters, composed behind a facade that targets one backend or mirrors
//! across all of them.

pub mod api;
pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod models;

pub use api::AppState;
pub use backends::BackendKind;
pub use cache::{Cache, LruEngine};
pub use config::Config;
pub use error::CacheError;
pub use facade::{FacadeConfig, Route, UnifiedCache};
