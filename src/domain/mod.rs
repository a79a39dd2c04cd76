pub mod constants;
pub mod entities;
pub mod value_objects;

pub use constants::{SELECTED_PROJECT_STORAGE_KEY, TEMPORARY_POST_ID_PREFIX};
pub use entities::{
    Author, CacheSnapshot, CurrentUser, LikeSummary, MutationKind, OptimisticMutation,
    PendingMutation, Post, PostContent, PostType, Project,
};
pub use value_objects::{OptimisticUpdateId, PostId, ProjectId, UserId};
