use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
    #[error("Cached value for {key} could not be decoded: {reason}")]
    Corrupt { key: String, reason: String },
}

/// A string key-value store whose entries expire.
#[allow(async_fn_in_trait)]
pub trait KeyValueCache {
    /// Returns the value stored under `key`, or `None` if it is missing or has expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Removes every entry.
    async fn flush(&self) -> Result<(), CacheError>;

    /// The number of live entries.
    async fn len(&self) -> Result<usize, CacheError>;
}
