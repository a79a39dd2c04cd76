use super::post::{LikeSummary, Post, PostContent};
use super::user::Author;
use crate::domain::value_objects::{OptimisticUpdateId, PostId, ProjectId};
use chrono::{DateTime, Utc};

/// キャッシュへ楽観的に適用する変更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimisticMutation {
    Insert { author: Author, content: PostContent },
    ToggleLike { post_id: PostId },
}

/// 楽観的適用で実際に何が起きたか
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Insert {
        temp_id: PostId,
    },
    /// `previous` が `None` のときは対象の投稿がキャッシュになかった
    ToggleLike {
        post_id: PostId,
        previous: Option<LikeSummary>,
    },
}

/// 適用直前のパーティションの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSnapshot {
    /// キャッシュに手を付けていないので戻すものはない
    Untouched,
    /// パーティション自体が存在しなかった
    Absent,
    Entry(Vec<Post>),
}

/// 未確定の楽観的変更。確定かロールバックで一度だけ消費される
#[derive(Debug)]
pub struct PendingMutation {
    id: OptimisticUpdateId,
    project_id: ProjectId,
    kind: MutationKind,
    snapshot: CacheSnapshot,
    created_at: DateTime<Utc>,
}

impl PendingMutation {
    pub fn new(project_id: ProjectId, kind: MutationKind, snapshot: CacheSnapshot) -> Self {
        Self {
            id: OptimisticUpdateId::generate(),
            project_id,
            kind,
            snapshot,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &OptimisticUpdateId {
        &self.id
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn kind(&self) -> &MutationKind {
        &self.kind
    }

    pub fn snapshot(&self) -> &CacheSnapshot {
        &self.snapshot
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn temp_post_id(&self) -> Option<&PostId> {
        match &self.kind {
            MutationKind::Insert { temp_id } => Some(temp_id),
            MutationKind::ToggleLike { .. } => None,
        }
    }

    /// クリック時点で表示されていたいいね状態
    pub fn previous_like(&self) -> Option<LikeSummary> {
        match &self.kind {
            MutationKind::ToggleLike { previous, .. } => *previous,
            MutationKind::Insert { .. } => None,
        }
    }

    pub fn into_parts(self) -> (ProjectId, MutationKind, CacheSnapshot) {
        (self.project_id, self.kind, self.snapshot)
    }
}
