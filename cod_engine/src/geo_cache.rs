//! Cache-aside wrapper around a [`GeoLocator`].
//!
//! Successful lookups are stored in a [`KeyValueCache`] under `ip_<ip>` for [`GeoCacheConfig::ttl`]. Unlocatable IPs
//! and transport failures are never cached, so they are retried on the next lookup. A misbehaving cache backend only
//! costs an extra network call: cache errors are logged and the origin is queried instead.
use std::time::Duration;

use log::*;

use crate::traits::{CacheError, GeoLocator, GeoLookupError, GeoResult, KeyValueCache};

pub const DEFAULT_GEO_CACHE_TTL: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone)]
pub struct GeoCacheConfig {
    pub ttl: Duration,
}

impl Default for GeoCacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_GEO_CACHE_TTL }
    }
}

pub fn cache_key(ip: &str) -> String {
    format!("ip_{}", ip.trim())
}

pub struct GeolocationCache<C, L> {
    cache: C,
    locator: L,
    config: GeoCacheConfig,
}

impl<C, L> GeolocationCache<C, L> {
    pub fn new(cache: C, locator: L, config: GeoCacheConfig) -> Self {
        Self { cache, locator, config }
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn config(&self) -> &GeoCacheConfig {
        &self.config
    }
}

impl<C, L> GeolocationCache<C, L>
where
    C: KeyValueCache,
    L: GeoLocator,
{
    pub async fn lookup(&self, ip: &str) -> Result<GeoResult, GeoLookupError> {
        let key = cache_key(ip);
        match self.cached(&key).await {
            Ok(Some(result)) => {
                trace!("🌍️ Cache hit for {ip}");
                return Ok(result);
            },
            Ok(None) => trace!("🌍️ Cache miss for {ip}"),
            Err(e) => warn!("🌍️ Could not read {key} from the cache. {e}"),
        }
        let result = self.locator.locate(ip.trim()).await?;
        if result.is_success() {
            self.store(&key, &result).await;
        } else {
            debug!("🌍️ {ip} could not be located ({}). Not caching the result.", result.message.as_deref().unwrap_or("-"));
        }
        Ok(result)
    }

    pub async fn flush(&self) -> Result<(), CacheError> {
        info!("🌍️ Flushing the geolocation cache");
        self.cache.flush().await
    }

    pub async fn cached_entries(&self) -> Result<usize, CacheError> {
        self.cache.len().await
    }

    async fn cached(&self, key: &str) -> Result<Option<GeoResult>, CacheError> {
        match self.cache.get(key).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| CacheError::Corrupt { key: key.to_string(), reason: e.to_string() }),
            None => Ok(None),
        }
    }

    async fn store(&self, key: &str, result: &GeoResult) {
        let json = match serde_json::to_string(result) {
            Ok(json) => json,
            Err(e) => {
                warn!("🌍️ Could not serialize the geolocation result for {key}. {e}");
                return;
            },
        };
        if let Err(e) = self.cache.put(key, json, self.config.ttl).await {
            warn!("🌍️ Could not store {key} in the cache. {e}");
        }
    }
}
