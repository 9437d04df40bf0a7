use std::{collections::HashMap, sync::Arc, time::Duration};

use log::*;
use tokio::{sync::Mutex, time::Instant};

use crate::traits::{CacheError, KeyValueCache};

pub const DEFAULT_MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// A [`KeyValueCache`] with a hard cap on the number of entries.
///
/// When an insert would exceed the cap, expired entries are purged first. If that frees nothing, the entry closest to
/// expiry is evicted. Expiry uses `tokio::time`, so tests can drive it with a paused clock.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    max_entries: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self { entries: Arc::new(Mutex::new(HashMap::new())), max_entries: max_entries.max(1) }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

fn make_room(entries: &mut HashMap<String, Entry>, max_entries: usize, now: Instant) {
    if entries.len() < max_entries {
        return;
    }
    entries.retain(|_, e| e.expires_at > now);
    while entries.len() >= max_entries {
        let victim = entries.iter().min_by_key(|(_, e)| e.expires_at).map(|(k, _)| k.clone());
        match victim {
            Some(key) => {
                trace!("🌍️ Cache is full. Evicting {key}");
                entries.remove(&key);
            },
            None => break,
        }
    }
}

impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            },
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        if !entries.contains_key(key) {
            make_room(&mut entries, self.max_entries, now);
        }
        entries.insert(key.to_string(), Entry { value, expires_at: now + ttl });
        Ok(())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        debug!("🌍️ Flushing {} cache entries", entries.len());
        entries.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        let entries = self.entries.lock().await;
        let now = Instant::now();
        Ok(entries.values().filter(|e| e.expires_at > now).count())
    }
}
