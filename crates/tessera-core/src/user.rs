//! The user entity.

use serde::{Deserialize, Serialize};

/// A registered user.
///
/// `id` is assigned by the durable store at insertion time and never changes.
/// Users are created and deleted but never modified in place. The serialized
/// form (`{"id", "name", "email"}`) is also the cache payload, so it must stay
/// a lossless round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    /// Store-assigned identifier.
    #[cfg_attr(feature = "openapi", schema(example = 1))]
    pub id: i64,
    /// Display name.
    #[cfg_attr(feature = "openapi", schema(example = "John Doe"))]
    pub name: String,
    /// Email address, unique across all users.
    #[cfg_attr(feature = "openapi", schema(example = "john.doe@example.com"))]
    pub email: String,
}

impl User {
    /// Creates a user value. Only stores and tests construct users with ids.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User#{} <{}>", self.id, self.email)
    }
}
