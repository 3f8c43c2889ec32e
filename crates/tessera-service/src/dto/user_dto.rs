//! User-related DTOs.

use serde::{Deserialize, Serialize};
use tessera_core::rules::not_blank;
use utoipa::ToSchema;
use validator::Validate;

/// Request to create a new user.
///
/// The id is assigned by the store, so it is not part of the request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "john.doe@example.com")]
    pub email: String,
}

impl CreateUserRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}
