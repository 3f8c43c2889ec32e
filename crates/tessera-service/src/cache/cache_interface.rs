//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use std::time::Duration;
use tessera_core::TesseraResult;

/// Key-value cache with per-entry expiry.
///
/// Values are JSON strings for type-erased storage; see [`CacheExt`] for the
/// typed helpers. Callers treat every error from this trait as non-fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheInterface: Send + Sync {
    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> TesseraResult<Option<String>>;

    /// Set a raw JSON value in the cache with a TTL.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> TesseraResult<()>;

    /// Delete a value from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> TesseraResult<bool>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Extension trait with typed methods for convenience.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get a typed value from the cache.
    ///
    /// A payload that does not decode as `T` is reported as
    /// [`TesseraError::Internal`](tessera_core::TesseraError::Internal),
    /// backend failures as `Cache`.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> TesseraResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => {
                let value: T = serde_json::from_str(&json)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in the cache.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> TesseraResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<T: CacheInterface + ?Sized> CacheExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{TesseraError, User};

    #[tokio::test]
    async fn test_get_decodes_payload() {
        let mut cache = MockCacheInterface::new();
        cache
            .expect_get_raw()
            .returning(|_| Ok(Some(r#"{"id":1,"name":"Al","email":"al@x.com"}"#.to_string())));

        let user: Option<User> = cache.get("user:1").await.unwrap();
        assert_eq!(user, Some(User::new(1, "Al", "al@x.com")));
    }

    #[tokio::test]
    async fn test_get_corrupt_payload_is_internal_error() {
        let mut cache = MockCacheInterface::new();
        cache
            .expect_get_raw()
            .returning(|_| Ok(Some("{not json".to_string())));

        let err = cache.get::<User>("user:1").await.unwrap_err();
        assert!(matches!(err, TesseraError::Internal(_)));
    }

    #[tokio::test]
    async fn test_set_serializes_list() {
        let mut cache = MockCacheInterface::new();
        cache
            .expect_set_raw()
            .withf(|key, value, ttl| {
                key == "all_users"
                    && value == r#"[{"id":1,"name":"Al","email":"al@x.com"}]"#
                    && *ttl == Duration::from_secs(60)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let users = vec![User::new(1, "Al", "al@x.com")];
        cache
            .set("all_users", &users, Duration::from_secs(60))
            .await
            .unwrap();
    }
}
