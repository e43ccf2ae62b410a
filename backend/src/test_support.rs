//! In-memory adapters for integration tests and single-process demos.
//!
//! Compiled for unit tests and behind the `test-support` feature. The
//! adapters count the calls tests care about, such as repository lookups and
//! cache hits, so read-through behaviour can be asserted from outside.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{
    NewsCache, NewsCacheError, NewsCacheKey, NewsRepository, NewsRepositoryError, UserRepository,
    UserRepositoryError,
};
use crate::domain::{News, ObjectId, User};

fn lock<T>(mutex: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    mutex.lock().ok()
}

/// News store held in a map.
#[derive(Debug, Default)]
pub struct InMemoryNewsRepository {
    items: Mutex<HashMap<ObjectId, News>>,
    lookups: AtomicUsize,
}

impl InMemoryNewsRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find_by_id` calls served so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.items).map_or(0, |items| items.len())
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn items(&self) -> Result<MutexGuard<'_, HashMap<ObjectId, News>>, NewsRepositoryError> {
        lock(&self.items).ok_or_else(|| NewsRepositoryError::query("news store lock poisoned"))
    }
}

#[async_trait]
impl NewsRepository for InMemoryNewsRepository {
    async fn list_all(&self) -> Result<Vec<News>, NewsRepositoryError> {
        Ok(self.items()?.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<News>, NewsRepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.items()?.get(id).cloned())
    }

    async fn insert(&self, news: &News) -> Result<(), NewsRepositoryError> {
        self.items()?.insert(news.id, news.clone());
        Ok(())
    }

    async fn update(&self, news: &News) -> Result<(), NewsRepositoryError> {
        if let Some(stored) = self.items()?.get_mut(&news.id) {
            *stored = news.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), NewsRepositoryError> {
        self.items()?.remove(id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), NewsRepositoryError> {
        self.items()?.clear();
        Ok(())
    }
}

/// User store held in a map.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<ObjectId, User>>,
}

impl InMemoryUserRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `user` directly, bypassing the service.
    pub fn seed(&self, user: User) {
        if let Some(mut users) = lock(&self.users) {
            users.insert(user.id, user);
        }
    }

    /// Stored copy of the user under `id`.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<User> {
        lock(&self.users).and_then(|users| users.get(id).cloned())
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<ObjectId, User>>, UserRepositoryError> {
        lock(&self.users).ok_or_else(|| UserRepositoryError::query("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.users()?.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.users()?.get(id).cloned())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        if let Some(stored) = self.users()?.get_mut(&user.id) {
            *stored = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), UserRepositoryError> {
        self.users()?.remove(id);
        Ok(())
    }
}

/// String cache held in a map, with hit counting and an outage switch.
#[derive(Debug, Default)]
pub struct InMemoryNewsCache {
    entries: Mutex<HashMap<String, String>>,
    hits: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryNewsCache {
    /// Empty, reachable cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls that found an entry.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw entry stored under `key`.
    #[must_use]
    pub fn entry(&self, key: &NewsCacheKey) -> Option<String> {
        lock(&self.entries).and_then(|entries| entries.get(key.as_str()).cloned())
    }

    /// Make every subsequent call fail with a backend error, or recover.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, NewsCacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(NewsCacheError::backend("cache is unavailable"));
        }
        lock(&self.entries).ok_or_else(|| NewsCacheError::backend("cache lock poisoned"))
    }
}

#[async_trait]
impl NewsCache for InMemoryNewsCache {
    async fn get(&self, key: &NewsCacheKey) -> Result<Option<String>, NewsCacheError> {
        let value = self.entries()?.get(key.as_str()).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(value)
    }

    async fn set(&self, key: &NewsCacheKey, value: String) -> Result<(), NewsCacheError> {
        self.entries()?.insert(key.as_str().to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &NewsCacheKey) -> Result<(), NewsCacheError> {
        self.entries()?.remove(key.as_str());
        Ok(())
    }
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock reading `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance_seconds(&self, seconds: i64) {
        if let Some(mut now) = lock(&self.0) {
            *now += TimeDelta::seconds(seconds);
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        lock(&self.0).map_or_else(Utc::now, |now| *now)
    }
}
