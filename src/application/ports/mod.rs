pub mod cache;
pub mod feed_gateway;
pub mod identity;
pub mod key_value_store;
pub mod project_directory;

pub use cache::{FeedCache, FeedCacheEvent, FeedChange};
pub use feed_gateway::FeedGateway;
pub use identity::IdentityProvider;
pub use key_value_store::KeyValueStore;
pub use project_directory::ProjectDirectory;
