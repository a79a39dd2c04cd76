use crate::domain::entities::{OptimisticMutation, PendingMutation, Post};
use crate::domain::value_objects::{OptimisticUpdateId, ProjectId};
use async_trait::async_trait;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedChange {
    Replaced,
    OptimisticApplied(OptimisticUpdateId),
    Committed(OptimisticUpdateId),
    RolledBack(OptimisticUpdateId),
    Invalidated,
}

/// パーティションが変わったことをビューへ知らせる通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCacheEvent {
    pub project_id: ProjectId,
    pub change: FeedChange,
}

/// プロジェクト単位のフィードキャッシュのポート
#[async_trait]
pub trait FeedCache: Send + Sync {
    /// 現在のパーティション（新しい順）。未知のプロジェクトなら空
    async fn read(&self, project_id: &ProjectId) -> Vec<Post>;

    /// リモート取得結果でパーティションを丸ごと差し替え（未確定の楽観的状態より優先）
    async fn replace(&self, project_id: &ProjectId, posts: Vec<Post>);

    /// 楽観的変更を即座に反映し、ロールバック用のトークンを返す
    async fn apply_optimistic(
        &self,
        project_id: &ProjectId,
        mutation: OptimisticMutation,
    ) -> PendingMutation;

    /// サーバーが返した投稿で仮の投稿を置き換える。トークンは消費しない
    async fn settle_insert(&self, pending: &PendingMutation, confirmed: Post);

    /// 権威ある取得結果で確定する
    async fn commit(&self, pending: PendingMutation, authoritative: Vec<Post>);

    /// 現在の状態のまま確定する
    async fn settle(&self, pending: PendingMutation);

    /// 楽観的変更を取り消す
    async fn rollback(&self, pending: PendingMutation);

    async fn invalidate(&self, project_id: &ProjectId);

    fn subscribe(&self) -> broadcast::Receiver<FeedCacheEvent>;
}
