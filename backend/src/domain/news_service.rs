//! News service: CRUD over news items with a read-through cache.
//!
//! Creating an item publishes a [`NewsProcessMessage`] so the users service
//! can register it; confirmations coming back set the item's publish
//! timestamp. Store and cache failures surface as
//! [`ErrorCode::Unprocessable`](crate::domain::ErrorCode::Unprocessable)
//! after being logged in full. Publish failures are logged and swallowed.

use std::sync::Arc;

use event_contracts::{ConfirmationMessage, NewsProcessMessage};
use tracing::{debug, error, info};

use super::events::publish_envelope;
use super::ports::{
    EventPublisher, NewsCache, NewsCacheError, NewsCacheKey, NewsRepository, NewsRepositoryError,
};
use super::{Error, News, NewsDraft, ObjectId, parse_confirmation_timestamp};

/// User every new item is registered against.
///
/// Creation requests carry no user, so the registration message always names
/// this fixed identifier.
pub const PLACEHOLDER_USER_ID: &str = "67372df1077cd2c1072a883b";

/// News item operations shared by the HTTP handlers and the confirmation
/// consumer.
#[derive(Clone)]
pub struct NewsService {
    repository: Arc<dyn NewsRepository>,
    cache: Arc<dyn NewsCache>,
    publisher: Arc<dyn EventPublisher>,
}

impl NewsService {
    /// Create a service over the given adapters.
    pub fn new(
        repository: Arc<dyn NewsRepository>,
        cache: Arc<dyn NewsCache>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            cache,
            publisher,
        }
    }

    /// Every stored item. An empty store yields an empty list.
    ///
    /// # Errors
    /// Returns `Unprocessable` when the store fails.
    pub async fn list_all(&self) -> Result<Vec<News>, Error> {
        info!("listing all news");
        let news = self
            .repository
            .list_all()
            .await
            .map_err(|err| repository_failure("list all news", &err))?;
        info!(count = news.len(), "listed all news");
        Ok(news)
    }

    /// Item stored under `id`, served from the cache when present.
    ///
    /// A miss loads from the store and seeds the cache.
    ///
    /// # Errors
    /// Returns `NotFound` when no item exists and `Unprocessable` when the
    /// store or cache fails.
    pub async fn get_by_id(&self, id: &ObjectId) -> Result<News, Error> {
        info!(news_id = %id, "fetching news");
        let key = NewsCacheKey::for_news(id);
        let cached = self
            .cache
            .get(&key)
            .await
            .map_err(|err| cache_failure("read news from cache", &err))?;
        if let Some(payload) = cached.filter(|payload| !payload.is_empty()) {
            let news = serde_json::from_str(&payload).map_err(|err| {
                cache_failure(
                    "decode cached news",
                    &NewsCacheError::serialization(err.to_string()),
                )
            })?;
            debug!(news_id = %id, "news served from cache");
            return Ok(news);
        }

        let news = self.require(id).await?;
        self.store_in_cache(&news).await?;
        info!(news_id = %id, "fetched news");
        Ok(news)
    }

    /// Store a new item, seed the cache and ask the users service to
    /// register it.
    ///
    /// # Errors
    /// Returns `Unprocessable` when the store or cache fails. Publish
    /// failures are logged only.
    pub async fn create(&self, draft: NewsDraft) -> Result<News, Error> {
        info!("creating news");
        let news = News::from_draft(draft);
        self.repository
            .insert(&news)
            .await
            .map_err(|err| repository_failure("insert news", &err))?;
        self.store_in_cache(&news).await?;

        let message = NewsProcessMessage::new(news.id.to_string(), PLACEHOLDER_USER_ID);
        if let Err(err) = publish_envelope(self.publisher.as_ref(), &message).await {
            error!(news_id = %news.id, error = %err, "failed to publish registration request");
        }
        info!(news_id = %news.id, "created news");
        Ok(news)
    }

    /// Replace every mutable field of the item stored under `id`.
    ///
    /// # Errors
    /// Returns `NotFound` without touching the store when no item exists and
    /// `Unprocessable` when the store or cache fails.
    pub async fn update(&self, id: &ObjectId, draft: NewsDraft) -> Result<News, Error> {
        info!(news_id = %id, "updating news");
        self.require(id).await?;
        let news = News::with_id(*id, draft);
        self.repository
            .update(&news)
            .await
            .map_err(|err| repository_failure("update news", &err))?;
        self.refresh_cache(&news).await?;
        info!(news_id = %id, "updated news");
        Ok(news)
    }

    /// Remove the item stored under `id` and its cache entry.
    ///
    /// # Errors
    /// Returns `NotFound` without touching the store when no item exists and
    /// `Unprocessable` when the store or cache fails.
    pub async fn delete(&self, id: &ObjectId) -> Result<(), Error> {
        info!(news_id = %id, "deleting news");
        self.require(id).await?;
        self.repository
            .delete(id)
            .await
            .map_err(|err| repository_failure("delete news", &err))?;
        self.cache
            .remove(&NewsCacheKey::for_news(id))
            .await
            .map_err(|err| cache_failure("evict news from cache", &err))?;
        info!(news_id = %id, "deleted news");
        Ok(())
    }

    /// Remove every item.
    ///
    /// Only the coarse `all_news` cache key is cleared; per-item entries
    /// stay cached.
    ///
    /// # Errors
    /// Returns `Unprocessable` when the store or cache fails.
    pub async fn delete_all(&self) -> Result<(), Error> {
        info!("deleting all news");
        self.repository
            .delete_all()
            .await
            .map_err(|err| repository_failure("delete all news", &err))?;
        self.cache
            .remove(&NewsCacheKey::all_news())
            .await
            .map_err(|err| cache_failure("evict all_news from cache", &err))?;
        info!("deleted all news");
        Ok(())
    }

    /// Set the publish timestamp named by a confirmation.
    ///
    /// Re-applying the same confirmation overwrites the timestamp with the
    /// same value.
    ///
    /// # Errors
    /// Returns `NotFound` when no item exists and `Unprocessable` when the
    /// identifier or timestamp cannot be read or the store fails.
    pub async fn apply_confirmation(&self, message: &ConfirmationMessage) -> Result<News, Error> {
        info!(
            object_id = %message.object_id,
            timestamp = %message.confirmation_timestamp,
            "applying confirmation"
        );
        let id: ObjectId = message.object_id.parse().map_err(|err| {
            error!(object_id = %message.object_id, error = %err, "confirmation names an invalid id");
            Error::unprocessable(format!(
                "news identifier {} is not valid",
                message.object_id
            ))
        })?;
        let mut news = self.require(&id).await?;
        let published_at =
            parse_confirmation_timestamp(&message.confirmation_timestamp).map_err(|err| {
                error!(news_id = %id, error = %err, "confirmation timestamp unreadable");
                Error::unprocessable(format!(
                    "failed to update the timestamp of news {id}"
                ))
            })?;
        news.published_at = Some(published_at);
        self.repository
            .update(&news)
            .await
            .map_err(|err| repository_failure("update news timestamp", &err))?;
        self.refresh_cache(&news).await?;
        info!(news_id = %id, published_at = %published_at, "news confirmed");
        Ok(news)
    }

    async fn require(&self, id: &ObjectId) -> Result<News, Error> {
        let found = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|err| repository_failure("find news", &err))?;
        found.ok_or_else(|| {
            debug!(news_id = %id, "news not found");
            Error::not_found(format!("news with id {id} not found"))
        })
    }

    async fn store_in_cache(&self, news: &News) -> Result<(), Error> {
        let payload = serde_json::to_string(news).map_err(|err| {
            cache_failure(
                "encode news for cache",
                &NewsCacheError::serialization(err.to_string()),
            )
        })?;
        self.cache
            .set(&NewsCacheKey::for_news(&news.id), payload)
            .await
            .map_err(|err| cache_failure("write news to cache", &err))
    }

    async fn refresh_cache(&self, news: &News) -> Result<(), Error> {
        self.cache
            .remove(&NewsCacheKey::for_news(&news.id))
            .await
            .map_err(|err| cache_failure("evict news from cache", &err))?;
        self.store_in_cache(news).await
    }
}

fn repository_failure(action: &str, err: &NewsRepositoryError) -> Error {
    error!(error = %err, "failed to {action}");
    Error::unprocessable(format!("failed to {action}"))
}

fn cache_failure(action: &str, err: &NewsCacheError) -> Error {
    error!(error = %err, "failed to {action}");
    Error::unprocessable(format!("failed to {action}"))
}

#[cfg(test)]
#[path = "news_service_tests.rs"]
mod tests;
