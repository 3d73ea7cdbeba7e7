use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::AppPaths;
use crate::config::files;
use crate::error::{AppError, AppResult};
use crate::sync::cache::CacheRecord;

use super::InboxStore;

type NotifiedFlags = BTreeMap<String, bool>;

// two processes sharing a profile can still race on the flags file
#[derive(Debug)]
pub struct FileStore {
    cache_path: PathBuf,
    notified_path: PathBuf,
    flags_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(cache_path: PathBuf, notified_path: PathBuf) -> Self {
        Self {
            cache_path,
            notified_path,
            flags_lock: Mutex::new(()),
        }
    }

    pub fn for_profile(paths: &AppPaths, profile: &str) -> Self {
        Self::new(paths.cache_file(profile), paths.notified_file(profile))
    }

    fn load_flags(&self) -> AppResult<NotifiedFlags> {
        Ok(files::read_json(&self.notified_path)?.unwrap_or_default())
    }
}

impl InboxStore for FileStore {
    fn load_cache(&self) -> AppResult<Option<CacheRecord>> {
        match files::read_json(&self.cache_path) {
            Ok(record) => Ok(record),
            Err(AppError::Json(err)) => {
                // the next successful refresh overwrites it
                tracing::warn!(
                    path = %self.cache_path.display(),
                    error = %err,
                    "ignoring unreadable cache"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn save_cache(&self, record: &CacheRecord) -> AppResult<()> {
        files::write_json_private(&self.cache_path, record)
    }

    fn is_notified(&self, id: &str) -> AppResult<bool> {
        let _guard = self.flags_lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load_flags()?.get(id).copied().unwrap_or(false))
    }

    fn mark_notified(&self, id: &str) -> AppResult<bool> {
        let _guard = self.flags_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut flags = self.load_flags()?;
        if flags.get(id).copied().unwrap_or(false) {
            return Ok(false);
        }

        flags.insert(id.to_string(), true);
        files::write_json_private(&self.notified_path, &flags)?;
        Ok(true)
    }

    fn clear(&self) -> AppResult<()> {
        let _guard = self.flags_lock.lock().unwrap_or_else(|e| e.into_inner());
        files::remove_if_exists(&self.cache_path)?;
        files::remove_if_exists(&self.notified_path)
    }
}
