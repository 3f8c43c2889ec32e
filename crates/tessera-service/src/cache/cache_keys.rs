//! Cache key generators.
//!
//! Keys are stable across releases: a renamed key would leave stale entries
//! alive for a full TTL after deploy.

/// Key for the full user list.
#[must_use]
pub fn all_users() -> &'static str {
    "all_users"
}

/// Key for a single user by id.
#[must_use]
pub fn user_by_id(id: i64) -> String {
    format!("user:{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_users_key() {
        assert_eq!(all_users(), "all_users");
    }

    #[test]
    fn test_user_by_id_key() {
        assert_eq!(user_by_id(5), "user:5");
        assert_eq!(user_by_id(-1), "user:-1");
    }
}
