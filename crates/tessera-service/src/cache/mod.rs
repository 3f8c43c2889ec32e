//! Caching infrastructure for the service layer.
//!
//! A cache abstraction with a Redis implementation. Values are stored as JSON
//! strings so the trait stays dyn-compatible.

mod cache_interface;
pub mod cache_keys;
mod redis_cache;

#[cfg(test)]
pub use cache_interface::MockCacheInterface;
pub use cache_interface::{CacheExt, CacheInterface};
pub use redis_cache::{create_redis_pool, RedisCacheService};
