use super::project_selection::ProjectSelection;
use crate::application::ports::cache::{FeedCache, FeedCacheEvent};
use crate::application::ports::feed_gateway::FeedGateway;
use crate::application::ports::identity::IdentityProvider;
use crate::domain::entities::{Post, Project};
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// 選択中プロジェクトのフィードを読み込み、キャッシュから返す
pub struct FeedService {
    selection: ProjectSelection,
    cache: Arc<dyn FeedCache>,
    gateway: Arc<dyn FeedGateway>,
    identity: Arc<dyn IdentityProvider>,
}

impl FeedService {
    pub fn new(
        selection: ProjectSelection,
        cache: Arc<dyn FeedCache>,
        gateway: Arc<dyn FeedGateway>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            selection,
            cache,
            gateway,
            identity,
        }
    }

    /// リモートから取得してパーティションを差し替える
    ///
    /// プロジェクト未選択ならリモートを呼ばずに空を返す。
    pub async fn load_feed(&self) -> Result<Vec<Post>, AppError> {
        let Some(project_id) = self.selection.selected_project_id().await else {
            debug!("no project selected; skipping feed fetch");
            return Ok(Vec::new());
        };
        let user = self
            .identity
            .current_user()
            .await
            .ok_or_else(|| AppError::Unauthorized("no signed-in user".to_string()))?;

        let posts = self.gateway.fetch_posts(&project_id, &user.id).await?;
        self.cache.replace(&project_id, posts).await;
        Ok(self.cache.read(&project_id).await)
    }

    /// キャッシュ済みのフィード。未選択なら空
    pub async fn feed(&self) -> Vec<Post> {
        match self.selection.selected_project_id().await {
            Some(project_id) => self.cache.read(&project_id).await,
            None => Vec::new(),
        }
    }

    /// 選択を切り替える。解除したときは直前のパーティションを捨てる
    pub async fn select_project(&self, project: Option<Project>) {
        if project.is_none() {
            if let Some(previous) = self.selection.selected_project_id().await {
                self.cache.invalidate(&previous).await;
            }
        }
        self.selection.set_selected(project).await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedCacheEvent> {
        self.cache.subscribe()
    }
}
