pub mod cache;
pub mod coordinator;
pub mod retry;

pub use cache::CacheRecord;
pub use coordinator::{InboxSync, SyncOptions};
pub use retry::RetryPolicy;
