//! Read-through string cache for serialised news items.

use std::fmt;

use async_trait::async_trait;

use crate::domain::ObjectId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by cache adapters.
    pub enum NewsCacheError {
        /// Cache backend could not be reached.
        Backend { message: String } => "news cache backend failed: {message}",
        /// A cached entry could not be encoded or decoded.
        Serialization { message: String } => "news cache entry is unreadable: {message}",
    }
}

const ALL_NEWS_KEY: &str = "all_news";

/// Key under which a cache entry is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewsCacheKey(String);

impl NewsCacheKey {
    /// Key for a single item: `news_{id}`.
    ///
    /// # Examples
    /// ```
    /// use sportnews::domain::ObjectId;
    /// use sportnews::domain::ports::NewsCacheKey;
    ///
    /// let id: ObjectId = "67372df1077cd2c1072a883b".parse().expect("valid id");
    /// assert_eq!(NewsCacheKey::for_news(&id).as_str(), "news_67372df1077cd2c1072a883b");
    /// ```
    #[must_use]
    pub fn for_news(id: &ObjectId) -> Self {
        Self(format!("news_{id}"))
    }

    /// Coarse key cleared when every item is deleted.
    #[must_use]
    pub fn all_news() -> Self {
        Self(ALL_NEWS_KEY.to_owned())
    }

    /// Borrow the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NewsCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for NewsCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// String cache keyed by [`NewsCacheKey`].
///
/// Entries never expire on their own; the news service removes them on
/// update and delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsCache: Send + Sync {
    /// Cached value for `key`, or `None` on a miss.
    async fn get(&self, key: &NewsCacheKey) -> Result<Option<String>, NewsCacheError>;

    /// Store `value` under `key`, overwriting any previous entry.
    async fn set(&self, key: &NewsCacheKey, value: String) -> Result<(), NewsCacheError>;

    /// Drop the entry for `key`. Missing keys are not an error.
    async fn remove(&self, key: &NewsCacheKey) -> Result<(), NewsCacheError>;
}
