use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::AppResult;
use crate::sync::cache::CacheRecord;

use super::InboxStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    cache: Mutex<Option<CacheRecord>>,
    notified: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(record: CacheRecord) -> Self {
        Self {
            cache: Mutex::new(Some(record)),
            notified: Mutex::default(),
        }
    }

    pub fn notified_count(&self) -> usize {
        self.notified.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl InboxStore for MemoryStore {
    fn load_cache(&self) -> AppResult<Option<CacheRecord>> {
        Ok(self.cache.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save_cache(&self, record: &CacheRecord) -> AppResult<()> {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        Ok(())
    }

    fn is_notified(&self, id: &str) -> AppResult<bool> {
        Ok(self
            .notified
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id))
    }

    fn mark_notified(&self, id: &str) -> AppResult<bool> {
        Ok(self
            .notified
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string()))
    }

    fn clear(&self) -> AppResult<()> {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.notified
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }
}
