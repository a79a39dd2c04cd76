pub mod feed_service;
pub mod mutation_coordinator;
pub mod persisted_selection;
pub mod project_selection;
pub mod project_service;

pub use feed_service::FeedService;
pub use mutation_coordinator::{LikeAction, MutationCoordinator, MutationError, MutationState};
pub use persisted_selection::{PersistedSelection, SelectionLoadError};
pub use project_selection::ProjectSelection;
pub use project_service::ProjectService;
