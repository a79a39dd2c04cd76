use crate::domain::entities::{Post, PostContent};
use crate::domain::value_objects::{PostId, ProjectId, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// ホスト型バックエンドの投稿・いいね操作
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// 新しい順。各投稿には投稿者スナップショットと `viewer` から見たいいね集計が付く
    async fn fetch_posts(
        &self,
        project_id: &ProjectId,
        viewer: &UserId,
    ) -> Result<Vec<Post>, AppError>;

    async fn insert_post(
        &self,
        project_id: &ProjectId,
        author_id: &UserId,
        content: &PostContent,
    ) -> Result<Post, AppError>;

    async fn insert_like(&self, post_id: &PostId, user_id: &UserId) -> Result<(), AppError>;

    async fn remove_like(&self, post_id: &PostId, user_id: &UserId) -> Result<(), AppError>;
}
