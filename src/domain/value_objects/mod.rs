pub mod optimistic_update_id;
pub mod post_id;
pub mod project_id;
pub mod user_id;

pub use optimistic_update_id::OptimisticUpdateId;
pub use post_id::PostId;
pub use project_id::ProjectId;
pub use user_id::UserId;
