pub mod cache;
pub mod storage;

pub use cache::FeedCacheService;
pub use storage::{FileKeyValueStore, MemoryKeyValueStore};
