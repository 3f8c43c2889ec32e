//! User service trait definition.

use crate::dto::CreateUserRequest;
use async_trait::async_trait;
use tessera_core::{TesseraResult, User};

/// User service trait.
///
/// Errors are always store or validation errors; cache failures never
/// surface here.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Lists every user.
    async fn list_users(&self) -> TesseraResult<Vec<User>>;

    /// Gets a user by id.
    async fn get_user(&self, id: i64) -> TesseraResult<User>;

    /// Creates a new user.
    async fn create_user(&self, request: CreateUserRequest) -> TesseraResult<User>;

    /// Deletes a user.
    async fn delete_user(&self, id: i64) -> TesseraResult<()>;
}
