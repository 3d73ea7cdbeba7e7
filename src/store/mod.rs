pub mod file;
pub mod memory;

use crate::error::AppResult;
use crate::sync::cache::CacheRecord;

pub use file::FileStore;
pub use memory::MemoryStore;

pub trait InboxStore: Send + Sync {
    fn load_cache(&self) -> AppResult<Option<CacheRecord>>;
    fn save_cache(&self, record: &CacheRecord) -> AppResult<()>;
    fn is_notified(&self, id: &str) -> AppResult<bool>;
    // true only for the call that flipped the flag
    fn mark_notified(&self, id: &str) -> AppResult<bool>;
    fn clear(&self) -> AppResult<()>;
}
