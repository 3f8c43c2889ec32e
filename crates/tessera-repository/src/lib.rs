//! # Tessera Repository
//!
//! The durable store behind the user service.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn UserRepository>
//! PgUserRepository
//!   ↓  Arc<DatabasePool>
//! PostgreSQL
//! ```
//!
//! The store is authoritative. It assigns ids and enforces email
//! uniqueness; a duplicate insert surfaces as [`TesseraError::Conflict`].
//!
//! [`TesseraError::Conflict`]: tessera_core::TesseraError::Conflict

pub mod pool;
pub mod postgres;
pub mod traits;

pub use pool::*;
pub use postgres::*;
pub use traits::*;
