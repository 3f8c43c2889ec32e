//! Cache-aside user service.

use crate::cache::{cache_keys, CacheExt, CacheInterface};
use crate::dto::CreateUserRequest;
use crate::metrics::names;
use crate::user_service::UserService;
use async_trait::async_trait;
use metrics::counter;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tessera_core::{TesseraError, TesseraResult, User, ValidateExt};
use tessera_repository::UserRepository;
use tracing::{debug, info, warn};

/// Lifetime of every user cache entry, measured from write time.
pub const USER_CACHE_TTL: Duration = Duration::from_secs(60);

const ENTRY_LIST: &str = "all_users";
const ENTRY_USER: &str = "user";

/// User service backed by a durable store with a read-through cache.
///
/// Reads consult the cache first and populate it on a miss. Successful writes
/// delete the list entry and the affected user entry. The service holds no
/// state of its own and is shared behind `Arc`.
pub struct UserServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheInterface>,
}

impl UserServiceImpl {
    /// Creates a new user service.
    pub fn new(user_repository: Arc<dyn UserRepository>, cache: Arc<dyn CacheInterface>) -> Self {
        Self {
            user_repository,
            cache,
        }
    }

    /// Looks up `key`, treating backend errors and undecodable payloads as a miss.
    async fn cached<T>(&self, key: &str, entry: &'static str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        match self.cache.get::<T>(key).await {
            Ok(Some(value)) => {
                debug!(key, "Cache hit");
                counter!(names::CACHE_HITS_TOTAL, "entry" => entry).increment(1);
                Some(value)
            }
            Ok(None) => {
                debug!(key, "Cache miss");
                counter!(names::CACHE_MISSES_TOTAL, "entry" => entry).increment(1);
                None
            }
            Err(e) => {
                let reason = match &e {
                    TesseraError::Cache(_) => "backend",
                    _ => "corrupt",
                };
                warn!(key, error = %e, reason, "Cache read failed, falling back to store");
                counter!(names::CACHE_ERRORS_TOTAL, "op" => "get", "reason" => reason)
                    .increment(1);
                None
            }
        }
    }

    /// Stores `value` under `key`. Failures are logged and dropped.
    async fn populate<T>(&self, key: &str, value: &T)
    where
        T: Serialize + Send + Sync,
    {
        if let Err(e) = self.cache.set(key, value, USER_CACHE_TTL).await {
            warn!(key, error = %e, "Failed to populate cache");
            counter!(names::CACHE_ERRORS_TOTAL, "op" => "set", "reason" => "backend")
                .increment(1);
        }
    }

    /// Deletes each key independently. Failures are logged and dropped.
    async fn invalidate(&self, keys: &[&str]) {
        for key in keys {
            match self.cache.delete(key).await {
                Ok(existed) => debug!(key, existed, "Invalidated cache entry"),
                Err(e) => {
                    warn!(key, error = %e, "Failed to invalidate cache entry");
                    counter!(names::CACHE_ERRORS_TOTAL, "op" => "delete", "reason" => "backend")
                        .increment(1);
                }
            }
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn list_users(&self) -> TesseraResult<Vec<User>> {
        let key = cache_keys::all_users();

        if let Some(users) = self.cached::<Vec<User>>(key, ENTRY_LIST).await {
            return Ok(users);
        }

        let users = self.user_repository.find_all().await?;
        self.populate(key, &users).await;

        Ok(users)
    }

    async fn get_user(&self, id: i64) -> TesseraResult<User> {
        let key = cache_keys::user_by_id(id);

        if let Some(user) = self.cached::<User>(&key, ENTRY_USER).await {
            return Ok(user);
        }

        let user = self.user_repository.find_by_id(id).await?;
        self.populate(&key, &user).await;

        Ok(user)
    }

    async fn create_user(&self, request: CreateUserRequest) -> TesseraResult<User> {
        debug!("Creating user: {}", request.email);

        request.validate_request()?;

        let user = self
            .user_repository
            .insert(&request.name, &request.email)
            .await?;

        let user_key = cache_keys::user_by_id(user.id);
        self.invalidate(&[cache_keys::all_users(), user_key.as_str()]).await;

        info!("User created: {}", user.id);
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> TesseraResult<()> {
        debug!("Deleting user: {}", id);

        self.user_repository.delete_by_id(id).await?;

        let user_key = cache_keys::user_by_id(id);
        self.invalidate(&[cache_keys::all_users(), user_key.as_str()]).await;

        info!("User deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl")
            .field("cache_enabled", &self.cache.is_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MockCacheInterface;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory user store that counts calls.
    #[derive(Default)]
    struct InMemoryUserRepository {
        users: Mutex<BTreeMap<i64, User>>,
        next_id: Mutex<i64>,
        fail: bool,
        find_all_calls: AtomicUsize,
        find_by_id_calls: AtomicUsize,
        insert_calls: AtomicUsize,
        delete_calls: AtomicUsize,
    }

    impl InMemoryUserRepository {
        fn new() -> Self {
            Self::default()
        }

        fn with_users(users: Vec<User>) -> Self {
            let repo = Self::new();
            {
                let mut stored = repo.users.lock().unwrap();
                let mut next_id = repo.next_id.lock().unwrap();
                for user in users {
                    *next_id = (*next_id).max(user.id);
                    stored.insert(user.id, user);
                }
            }
            repo
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn check_available(&self) -> TesseraResult<()> {
            if self.fail {
                return Err(TesseraError::Database("connection refused".to_string()));
            }
            Ok(())
        }

        fn calls(counter: &AtomicUsize) -> usize {
            counter.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_all(&self) -> TesseraResult<Vec<User>> {
            self.find_all_calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            Ok(self.users.lock().unwrap().values().cloned().collect())
        }

        async fn find_by_id(&self, id: i64) -> TesseraResult<User> {
            self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            self.users
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| TesseraError::not_found("User", id))
        }

        async fn insert(&self, name: &str, email: &str) -> TesseraResult<User> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.email == email) {
                return Err(TesseraError::conflict(format!("Email already registered: {}", email)));
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let user = User::new(*next_id, name, email);
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn delete_by_id(&self, id: i64) -> TesseraResult<()> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            self.users
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| TesseraError::not_found("User", id))
        }
    }

    /// Cache fake that keeps entries in memory and records every call.
    #[derive(Default)]
    struct RecordingCache {
        entries: Mutex<HashMap<String, String>>,
        sets: Mutex<Vec<(String, Duration)>>,
        deletes: Mutex<Vec<String>>,
        gets: AtomicUsize,
    }

    impl RecordingCache {
        fn seed(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn entry(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn sets(&self) -> Vec<(String, Duration)> {
            self.sets.lock().unwrap().clone()
        }

        fn deletes(&self) -> Vec<String> {
            self.deletes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CacheInterface for RecordingCache {
        async fn get_raw(&self, key: &str) -> TesseraResult<Option<String>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.entry(key))
        }

        async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> TesseraResult<()> {
            self.sets.lock().unwrap().push((key.to_string(), ttl));
            self.seed(key, value);
            Ok(())
        }

        async fn delete(&self, key: &str) -> TesseraResult<bool> {
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        fn is_enabled(&self) -> bool {
            true
        }
    }

    /// A cache where every operation fails.
    fn broken_cache() -> MockCacheInterface {
        let mut cache = MockCacheInterface::new();
        cache
            .expect_get_raw()
            .returning(|_| Err(TesseraError::Cache("connection reset".to_string())));
        cache
            .expect_set_raw()
            .returning(|_, _, _| Err(TesseraError::Cache("connection reset".to_string())));
        cache
            .expect_delete()
            .returning(|_| Err(TesseraError::Cache("connection reset".to_string())));
        cache.expect_is_enabled().return_const(true);
        cache
    }

    fn al() -> User {
        User::new(1, "Al", "al@x.com")
    }

    fn service(
        repo: &Arc<InMemoryUserRepository>,
        cache: &Arc<RecordingCache>,
    ) -> UserServiceImpl {
        UserServiceImpl::new(repo.clone(), cache.clone())
    }

    #[tokio::test]
    async fn test_get_user_populates_then_hits() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        assert_eq!(service.get_user(1).await.unwrap(), al());
        assert_eq!(cache.sets(), vec![("user:1".to_string(), USER_CACHE_TTL)]);
        assert_eq!(
            cache.entry("user:1").as_deref(),
            Some(r#"{"id":1,"name":"Al","email":"al@x.com"}"#)
        );

        assert_eq!(service.get_user(1).await.unwrap(), al());
        assert_eq!(InMemoryUserRepository::calls(&repo.find_by_id_calls), 1);
        assert_eq!(cache.sets().len(), 1);
    }

    #[tokio::test]
    async fn test_get_user_miss_falls_back_to_store() {
        let user = User::new(5, "Eve", "eve@x.com");
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![user.clone()]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        assert_eq!(service.get_user(5).await.unwrap(), user);
        assert_eq!(InMemoryUserRepository::calls(&repo.find_by_id_calls), 1);
        assert_eq!(cache.sets(), vec![("user:5".to_string(), USER_CACHE_TTL)]);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        let err = service.get_user(999).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
        assert!(cache.sets().is_empty());
    }

    #[tokio::test]
    async fn test_list_users_hit_skips_store() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let cache = Arc::new(RecordingCache::default());
        cache.seed(
            "all_users",
            r#"[{"id":2,"name":"Bo","email":"bo@x.com"}]"#,
        );
        let service = service(&repo, &cache);

        let users = service.list_users().await.unwrap();
        assert_eq!(users, vec![User::new(2, "Bo", "bo@x.com")]);
        assert_eq!(InMemoryUserRepository::calls(&repo.find_all_calls), 0);
        assert!(cache.sets().is_empty());
    }

    #[tokio::test]
    async fn test_list_users_miss_populates() {
        let bo = User::new(2, "Bo", "bo@x.com");
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al(), bo.clone()]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        assert_eq!(service.list_users().await.unwrap(), vec![al(), bo.clone()]);
        assert_eq!(service.list_users().await.unwrap(), vec![al(), bo]);
        assert_eq!(InMemoryUserRepository::calls(&repo.find_all_calls), 1);
        assert_eq!(cache.sets(), vec![("all_users".to_string(), USER_CACHE_TTL)]);
    }

    #[tokio::test]
    async fn test_list_users_store_failure_skips_cache_write() {
        let repo = Arc::new(InMemoryUserRepository::failing());
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        let err = service.list_users().await.unwrap_err();
        assert!(matches!(err, TesseraError::Database(_)));
        assert!(cache.sets().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let cache = Arc::new(RecordingCache::default());
        cache.seed("user:1", "{\"id\": \"not a number\"");
        cache.seed("all_users", "garbage");
        let service = service(&repo, &cache);

        assert_eq!(service.get_user(1).await.unwrap(), al());
        assert_eq!(service.list_users().await.unwrap(), vec![al()]);
        assert_eq!(InMemoryUserRepository::calls(&repo.find_by_id_calls), 1);
        assert_eq!(InMemoryUserRepository::calls(&repo.find_all_calls), 1);

        let repaired: User = serde_json::from_str(&cache.entry("user:1").unwrap()).unwrap();
        assert_eq!(repaired, al());
    }

    #[tokio::test]
    async fn test_create_user_invalidates_list_and_new_entry() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        let created = service
            .create_user(CreateUserRequest::new("Bo", "bo@x.com"))
            .await
            .unwrap();

        assert_eq!(created, User::new(2, "Bo", "bo@x.com"));
        assert_eq!(cache.deletes(), vec!["all_users".to_string(), "user:2".to_string()]);
    }

    #[tokio::test]
    async fn test_create_user_makes_list_fresh() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        assert_eq!(service.list_users().await.unwrap().len(), 1);
        service
            .create_user(CreateUserRequest::new("Bo", "bo@x.com"))
            .await
            .unwrap();

        assert_eq!(service.list_users().await.unwrap().len(), 2);
        assert_eq!(InMemoryUserRepository::calls(&repo.find_all_calls), 2);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email_is_conflict_without_invalidation() {
        let bo = User::new(2, "Bo", "bo@x.com");
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![bo]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        let err = service
            .create_user(CreateUserRequest::new("Bobby", "bo@x.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, TesseraError::Conflict(_)));
        assert_eq!(err.status_code(), 409);
        assert!(cache.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_create_user_validation_happens_before_any_io() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        for request in [
            CreateUserRequest::new("", "al@x.com"),
            CreateUserRequest::new("  ", "al@x.com"),
            CreateUserRequest::new("Al", "not-an-email"),
        ] {
            let err = service.create_user(request).await.unwrap_err();
            assert!(matches!(err, TesseraError::Validation(_)));
        }

        assert_eq!(InMemoryUserRepository::calls(&repo.insert_calls), 0);
        assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
        assert!(cache.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_delete_user_invalidates_list_and_entry() {
        let cy = User::new(3, "Cy", "cy@x.com");
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al(), cy]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        service.get_user(3).await.unwrap();
        service.delete_user(3).await.unwrap();

        assert_eq!(cache.deletes(), vec!["all_users".to_string(), "user:3".to_string()]);
        assert_eq!(cache.entry("user:3"), None);
        assert!(service.get_user(3).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_user_has_no_cache_side_effects() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let cache = Arc::new(RecordingCache::default());
        let service = service(&repo, &cache);

        let err = service.delete_user(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(cache.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_broken_cache_never_fails_operations() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let service = UserServiceImpl::new(repo.clone(), Arc::new(broken_cache()));

        assert_eq!(service.list_users().await.unwrap(), vec![al()]);
        assert_eq!(service.get_user(1).await.unwrap(), al());

        let created = service
            .create_user(CreateUserRequest::new("Bo", "bo@x.com"))
            .await
            .unwrap();
        service.delete_user(created.id).await.unwrap();

        assert!(service.get_user(999).await.unwrap_err().is_not_found());
        assert!(matches!(
            service
                .create_user(CreateUserRequest::new("Al again", "al@x.com"))
                .await
                .unwrap_err(),
            TesseraError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_broken_cache_and_store_surface_store_error() {
        let repo = Arc::new(InMemoryUserRepository::failing());
        let service = UserServiceImpl::new(repo, Arc::new(broken_cache()));

        for err in [
            service.list_users().await.unwrap_err(),
            service.get_user(1).await.unwrap_err(),
            service.delete_user(1).await.unwrap_err(),
        ] {
            assert!(matches!(err, TesseraError::Database(_)));
        }
    }

    #[tokio::test]
    async fn test_delete_invalidation_attempts_every_key() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let mut cache = MockCacheInterface::new();
        cache
            .expect_delete()
            .times(2)
            .returning(|_| Err(TesseraError::Cache("timeout".to_string())));
        let service = UserServiceImpl::new(repo, Arc::new(cache));

        service.delete_user(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_reads_agree_and_populate_once_per_miss() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![al()]));
        let cache = Arc::new(RecordingCache::default());
        let service = Arc::new(service(&repo, &cache));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.get_user(1).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), al());
        }

        // Every read that missed went to the store and populated exactly once.
        let store_reads = InMemoryUserRepository::calls(&repo.find_by_id_calls);
        let sets = cache.sets();
        assert!((1..=8).contains(&store_reads));
        assert_eq!(sets.len(), store_reads);
        assert!(sets
            .iter()
            .all(|(key, ttl)| key == "user:1" && *ttl == USER_CACHE_TTL));
        assert_eq!(cache.entry("user:1"), Some(serde_json::to_string(&al()).unwrap()));

        // Once populated, further reads are served without the store.
        assert_eq!(service.get_user(1).await.unwrap(), al());
        assert_eq!(InMemoryUserRepository::calls(&repo.find_by_id_calls), store_reads);
    }
}
