use super::project_selection::ProjectSelection;
use crate::application::ports::cache::FeedCache;
use crate::application::ports::feed_gateway::FeedGateway;
use crate::application::ports::identity::IdentityProvider;
use crate::domain::entities::{
    CurrentUser, LikeSummary, OptimisticMutation, PendingMutation, Post, PostContent, PostType,
};
use crate::domain::value_objects::{PostId, ProjectId, UserId};
use crate::shared::error::AppError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 変更操作の失敗
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("no project is selected")]
    NoProjectSelected,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("invalid content: {0}")]
    InvalidContent(String),
    #[error("remote call rejected: {0}")]
    RemoteRejected(#[source] AppError),
    #[error("invalid mutation transition: {from} -> {to}")]
    InvalidTransition {
        from: MutationState,
        to: MutationState,
    },
}

impl MutationError {
    /// ユーザーが手動で再試行できる失敗か
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MutationError::RemoteRejected(_))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    OptimisticApplied,
    Committed,
    RolledBack,
}

impl MutationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationState::Idle => "idle",
            MutationState::OptimisticApplied => "optimistic_applied",
            MutationState::Committed => "committed",
            MutationState::RolledBack => "rolled_back",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MutationState::Committed | MutationState::RolledBack)
    }

    fn can_transition_to(self, next: MutationState) -> bool {
        matches!(
            (self, next),
            (MutationState::Idle, MutationState::OptimisticApplied)
                | (MutationState::OptimisticApplied, MutationState::Committed)
                | (MutationState::OptimisticApplied, MutationState::RolledBack)
        )
    }
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1回の変更呼び出しの状態
#[derive(Debug)]
struct Lifecycle {
    state: MutationState,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            state: MutationState::Idle,
        }
    }

    fn advance(&mut self, next: MutationState) -> Result<(), MutationError> {
        if !self.state.can_transition_to(next) {
            return Err(MutationError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

/// toggle_like の結果としてリモートへ送った操作
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LikeAction {
    Liked,
    Unliked,
}

type PendingLikes = Arc<Mutex<HashMap<PostId, usize>>>;

fn lock_likes(pending_likes: &PendingLikes) -> MutexGuard<'_, HashMap<PostId, usize>> {
    pending_likes.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 進行中のいいねを1件数える。破棄時に件数を戻す
struct LikeTicket {
    pending_likes: PendingLikes,
    post_id: PostId,
}

impl LikeTicket {
    fn acquire(pending_likes: &PendingLikes, post_id: &PostId) -> Self {
        *lock_likes(pending_likes)
            .entry(post_id.clone())
            .or_insert(0) += 1;
        Self {
            pending_likes: Arc::clone(pending_likes),
            post_id: post_id.clone(),
        }
    }
}

impl Drop for LikeTicket {
    fn drop(&mut self) {
        let mut pending = lock_likes(&self.pending_likes);
        if let Some(count) = pending.get_mut(&self.post_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                pending.remove(&self.post_id);
            }
        }
    }
}

/// 未確定の楽観的変更を保持する
///
/// 確定もロールバックもされずに破棄されたときは、リモートが受理済みなら
/// 現状のまま確定し、そうでなければロールバックする。
struct PendingGuard {
    cache: Arc<dyn FeedCache>,
    pending: Option<PendingMutation>,
    remote_accepted: bool,
}

impl PendingGuard {
    fn new(cache: Arc<dyn FeedCache>, pending: PendingMutation) -> Self {
        Self {
            cache,
            pending: Some(pending),
            remote_accepted: false,
        }
    }

    fn previous_like(&self) -> Option<LikeSummary> {
        self.pending
            .as_ref()
            .and_then(PendingMutation::previous_like)
    }

    fn accept(&mut self) {
        self.remote_accepted = true;
    }

    async fn settle_insert(&self, confirmed: Post) {
        if let Some(pending) = &self.pending {
            self.cache.settle_insert(pending, confirmed).await;
        }
    }

    async fn commit(mut self, authoritative: Vec<Post>) {
        if let Some(pending) = self.pending.take() {
            self.cache.commit(pending, authoritative).await;
        }
    }

    async fn settle(mut self) {
        if let Some(pending) = self.pending.take() {
            self.cache.settle(pending).await;
        }
    }

    async fn rollback(mut self) {
        if let Some(pending) = self.pending.take() {
            self.cache.rollback(pending).await;
        }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let accepted = self.remote_accepted;
        warn!(
            project_id = %pending.project_id(),
            update_id = %pending.id(),
            accepted,
            "mutation dropped before settling"
        );
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(update_id = %pending.id(), "no runtime left to settle dropped mutation");
            return;
        };
        let cache = Arc::clone(&self.cache);
        handle.spawn(async move {
            if accepted {
                cache.settle(pending).await;
            } else {
                cache.rollback(pending).await;
            }
        });
    }
}

/// 楽観的変更 → リモート呼び出し → 確定かロールバック、を1回ずつ回す
pub struct MutationCoordinator {
    selection: ProjectSelection,
    cache: Arc<dyn FeedCache>,
    gateway: Arc<dyn FeedGateway>,
    identity: Arc<dyn IdentityProvider>,
    reconcile_after_commit: bool,
    pending_likes: PendingLikes,
}

impl MutationCoordinator {
    pub fn new(
        selection: ProjectSelection,
        cache: Arc<dyn FeedCache>,
        gateway: Arc<dyn FeedGateway>,
        identity: Arc<dyn IdentityProvider>,
        reconcile_after_commit: bool,
    ) -> Self {
        Self {
            selection,
            cache,
            gateway,
            identity,
            reconcile_after_commit,
            pending_likes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 選択中のプロジェクトへ投稿する
    ///
    /// 仮の投稿を先頭に差し込んでから `insert_post` を呼ぶ。成功すればサーバーの
    /// 投稿で置き換え、失敗すれば差し込む前の状態へ戻してエラーを返す。
    /// 空白だけの本文は拒否するが、送る本文はそのまま。
    pub async fn create_post(
        &self,
        message: &str,
        post_type: PostType,
    ) -> Result<Post, MutationError> {
        let mut lifecycle = Lifecycle::new();
        let (project_id, user) = self.resolve_context().await?;

        if message.trim().is_empty() {
            return Err(MutationError::InvalidContent(
                "message must not be empty".to_string(),
            ));
        }
        let content = PostContent::new(post_type, message);
        let author = user.to_author();

        lifecycle.advance(MutationState::OptimisticApplied)?;
        let pending = self
            .cache
            .apply_optimistic(
                &project_id,
                OptimisticMutation::Insert {
                    author: author.clone(),
                    content: content.clone(),
                },
            )
            .await;
        let mut guard = PendingGuard::new(Arc::clone(&self.cache), pending);

        let created = match self
            .gateway
            .insert_post(&project_id, &user.id, &content)
            .await
        {
            Ok(created) => created,
            Err(err) => {
                return Err(self
                    .roll_back(&mut lifecycle, guard, &project_id, err)
                    .await);
            }
        };
        guard.accept();

        let confirmed = Post {
            id: created.id,
            project_id: project_id.clone(),
            content: created.content,
            created_at: created.created_at,
            author_id: user.id.clone(),
            author,
            like_summary: LikeSummary::default(),
        };
        guard.settle_insert(confirmed.clone()).await;
        self.commit(&mut lifecycle, guard, &project_id, &user.id)
            .await?;

        info!(project_id = %project_id, post_id = %confirmed.id, "post created");
        Ok(confirmed)
    }

    /// 表示中のいいね状態を反転し、リモートへ反映する
    ///
    /// クリック時点でキャッシュに見えていた状態から送る操作を決める。
    /// キャッシュに投稿がなければ「未いいね」として扱う。
    pub async fn toggle_like(&self, post_id: &PostId) -> Result<LikeAction, MutationError> {
        let mut lifecycle = Lifecycle::new();
        let (project_id, user) = self.resolve_context().await?;

        lifecycle.advance(MutationState::OptimisticApplied)?;
        let pending = self
            .cache
            .apply_optimistic(
                &project_id,
                OptimisticMutation::ToggleLike {
                    post_id: post_id.clone(),
                },
            )
            .await;
        let mut guard = PendingGuard::new(Arc::clone(&self.cache), pending);
        let _ticket = LikeTicket::acquire(&self.pending_likes, post_id);

        let was_liked = guard
            .previous_like()
            .is_some_and(|summary| summary.viewer_has_liked);
        let (action, result) = if was_liked {
            (
                LikeAction::Unliked,
                self.gateway.remove_like(post_id, &user.id).await,
            )
        } else {
            (
                LikeAction::Liked,
                self.gateway.insert_like(post_id, &user.id).await,
            )
        };

        match result {
            Ok(()) => {
                guard.accept();
                debug!(project_id = %project_id, post_id = %post_id, action = ?action, "like call accepted");
                self.commit(&mut lifecycle, guard, &project_id, &user.id)
                    .await?;
                Ok(action)
            }
            Err(err) => Err(self
                .roll_back(&mut lifecycle, guard, &project_id, err)
                .await),
        }
    }

    /// いいねのリモート呼び出しが進行中か。ビューはこの間ボタンを無効にする
    pub fn is_like_pending(&self, post_id: &PostId) -> bool {
        lock_likes(&self.pending_likes).contains_key(post_id)
    }

    /// プロジェクトとユーザーを一度だけ解決する
    async fn resolve_context(&self) -> Result<(ProjectId, CurrentUser), MutationError> {
        let project_id = self
            .selection
            .selected_project_id()
            .await
            .ok_or(MutationError::NoProjectSelected)?;
        let user = self
            .identity
            .current_user()
            .await
            .ok_or(MutationError::NotAuthenticated)?;
        Ok((project_id, user))
    }

    async fn commit(
        &self,
        lifecycle: &mut Lifecycle,
        guard: PendingGuard,
        project_id: &ProjectId,
        viewer: &UserId,
    ) -> Result<(), MutationError> {
        if !self.reconcile_after_commit {
            guard.settle().await;
            return lifecycle.advance(MutationState::Committed);
        }

        match self.gateway.fetch_posts(project_id, viewer).await {
            Ok(posts) => guard.commit(posts).await,
            Err(err) => {
                warn!(
                    project_id = %project_id,
                    error = %err,
                    "reconciling fetch failed; keeping settled state"
                );
                guard.settle().await;
            }
        }
        lifecycle.advance(MutationState::Committed)
    }

    /// トークンを必ず消費してから失敗を返す
    async fn roll_back(
        &self,
        lifecycle: &mut Lifecycle,
        guard: PendingGuard,
        project_id: &ProjectId,
        cause: AppError,
    ) -> MutationError {
        warn!(
            project_id = %project_id,
            error = %cause,
            "remote call failed; rolling back"
        );
        guard.rollback().await;
        if let Err(err) = lifecycle.advance(MutationState::RolledBack) {
            return err;
        }
        MutationError::RemoteRejected(cause)
    }
}
