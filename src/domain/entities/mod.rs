pub mod pending_mutation;
pub mod post;
pub mod project;
pub mod user;

pub use pending_mutation::{CacheSnapshot, MutationKind, OptimisticMutation, PendingMutation};
pub use post::{LikeSummary, Post, PostContent, PostType};
pub use project::Project;
pub use user::{Author, CurrentUser};
