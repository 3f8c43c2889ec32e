//! Repository trait definitions.

use async_trait::async_trait;
use tessera_core::{TesseraResult, User};

/// Durable user store.
///
/// Implementations map their own failures onto [`tessera_core::TesseraError`]:
/// a missing id is `NotFound`, a duplicate email is `Conflict`, and anything
/// else is `Database`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns every user, ordered by id.
    async fn find_all(&self) -> TesseraResult<Vec<User>>;

    /// Finds a user by id, failing with `NotFound` when absent.
    async fn find_by_id(&self, id: i64) -> TesseraResult<User>;

    /// Inserts a new user and returns it with its store-assigned id.
    async fn insert(&self, name: &str, email: &str) -> TesseraResult<User>;

    /// Deletes a user by id, failing with `NotFound` when nothing was removed.
    async fn delete_by_id(&self, id: i64) -> TesseraResult<()>;
}
