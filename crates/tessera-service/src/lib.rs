//! # Tessera Service
//!
//! The user service and its cache layer.
//!
//! [`UserServiceImpl`] mediates every read and write between callers, the
//! durable [`UserRepository`](tessera_repository::UserRepository) and a
//! [`CacheInterface`]. Reads go through the cache with a fixed
//! [`USER_CACHE_TTL`]; writes invalidate the affected keys. The cache is an
//! optimisation only: its failures are logged and never reach the caller.

pub mod cache;
pub mod dto;
pub mod r#impl;
pub mod metrics;
pub mod user_service;

pub use cache::*;
pub use dto::*;
pub use r#impl::*;
pub use user_service::*;
