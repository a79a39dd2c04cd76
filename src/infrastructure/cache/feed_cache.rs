use crate::application::ports::cache::{FeedCache, FeedCacheEvent, FeedChange};
use crate::domain::entities::{
    CacheSnapshot, MutationKind, OptimisticMutation, PendingMutation, Post,
};
use crate::domain::value_objects::ProjectId;
use crate::shared::config::RollbackStrategy;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};

const DEFAULT_EVENT_BUFFER: usize = 64;

/// プロジェクトIDをキーにしたフィードキャッシュ
#[derive(Clone)]
pub struct FeedCacheService {
    partitions: Arc<RwLock<HashMap<ProjectId, Vec<Post>>>>,
    rollback_strategy: RollbackStrategy,
    events: broadcast::Sender<FeedCacheEvent>,
}

impl FeedCacheService {
    pub fn new(rollback_strategy: RollbackStrategy, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            partitions: Arc::new(RwLock::new(HashMap::new())),
            rollback_strategy,
            events,
        }
    }

    pub fn rollback_strategy(&self) -> RollbackStrategy {
        self.rollback_strategy
    }

    /// キャッシュ済みのプロジェクト数
    pub async fn len(&self) -> usize {
        self.partitions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.partitions.read().await.is_empty()
    }

    pub async fn contains(&self, project_id: &ProjectId) -> bool {
        self.partitions.read().await.contains_key(project_id)
    }

    fn notify(&self, project_id: &ProjectId, change: FeedChange) {
        // 購読者がいなければ送信は失敗するが問題ない
        let _ = self.events.send(FeedCacheEvent {
            project_id: project_id.clone(),
            change,
        });
    }

    /// 新しい順に並べ、重複IDと別プロジェクトの投稿を落とす
    ///
    /// 閲覧者がいいね済みなのに件数が 0 の集計は 1 に直す。
    fn normalize(project_id: &ProjectId, posts: Vec<Post>) -> Vec<Post> {
        let mut seen = HashSet::new();
        let mut entries: Vec<Post> = posts
            .into_iter()
            .map(|mut post| {
                if post.like_summary.viewer_has_liked && post.like_summary.count == 0 {
                    warn!(
                        project_id = %project_id,
                        post_id = %post.id,
                        "liked post reported zero likes; counting the viewer"
                    );
                    post.like_summary.count = 1;
                }
                post
            })
            .filter(|post| {
                if &post.project_id != project_id {
                    warn!(
                        project_id = %project_id,
                        post_id = %post.id,
                        other_project = %post.project_id,
                        "dropping post stored under the wrong project"
                    );
                    return false;
                }
                seen.insert(post.id.clone())
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }

    fn restore_snapshot(
        partitions: &mut HashMap<ProjectId, Vec<Post>>,
        project_id: &ProjectId,
        snapshot: CacheSnapshot,
    ) {
        match snapshot {
            CacheSnapshot::Untouched => {}
            CacheSnapshot::Absent => {
                partitions.remove(project_id);
            }
            CacheSnapshot::Entry(posts) => {
                partitions.insert(project_id.clone(), posts);
            }
        }
    }

    fn revert_diff(
        partitions: &mut HashMap<ProjectId, Vec<Post>>,
        project_id: &ProjectId,
        kind: MutationKind,
    ) {
        let Some(entry) = partitions.get_mut(project_id) else {
            return;
        };
        match kind {
            MutationKind::Insert { temp_id } => {
                entry.retain(|post| post.id != temp_id);
            }
            MutationKind::ToggleLike {
                post_id,
                previous: Some(previous),
            } => {
                // 取得結果などで上書き済みなら触らない
                if let Some(post) = entry.iter_mut().find(|post| post.id == post_id) {
                    if post.like_summary == previous.toggled() {
                        post.like_summary = previous;
                    }
                }
            }
            MutationKind::ToggleLike { previous: None, .. } => {}
        }
    }
}

impl Default for FeedCacheService {
    fn default() -> Self {
        Self::new(RollbackStrategy::default(), DEFAULT_EVENT_BUFFER)
    }
}

#[async_trait]
impl FeedCache for FeedCacheService {
    async fn read(&self, project_id: &ProjectId) -> Vec<Post> {
        let partitions = self.partitions.read().await;
        partitions.get(project_id).cloned().unwrap_or_default()
    }

    async fn replace(&self, project_id: &ProjectId, posts: Vec<Post>) {
        let entries = Self::normalize(project_id, posts);
        {
            let mut partitions = self.partitions.write().await;
            debug!(project_id = %project_id, count = entries.len(), "replacing feed partition");
            partitions.insert(project_id.clone(), entries);
        }
        self.notify(project_id, FeedChange::Replaced);
    }

    async fn apply_optimistic(
        &self,
        project_id: &ProjectId,
        mutation: OptimisticMutation,
    ) -> PendingMutation {
        let pending = {
            let mut partitions = self.partitions.write().await;
            match mutation {
                OptimisticMutation::Insert { author, content } => {
                    let snapshot = match partitions.get(project_id) {
                        Some(posts) => CacheSnapshot::Entry(posts.clone()),
                        None => CacheSnapshot::Absent,
                    };
                    let post = Post::optimistic(project_id.clone(), author, content);
                    let temp_id = post.id.clone();
                    partitions
                        .entry(project_id.clone())
                        .or_default()
                        .insert(0, post);
                    PendingMutation::new(
                        project_id.clone(),
                        MutationKind::Insert { temp_id },
                        snapshot,
                    )
                }
                OptimisticMutation::ToggleLike { post_id } => {
                    let entry = partitions.get_mut(project_id);
                    let snapshot = entry
                        .as_ref()
                        .map(|posts| CacheSnapshot::Entry(posts.to_vec()));
                    let target = entry
                        .and_then(|posts| posts.iter_mut().find(|post| post.id == post_id));

                    match (target, snapshot) {
                        (Some(post), Some(snapshot)) => {
                            let previous = post.like_summary;
                            post.toggle_like();
                            PendingMutation::new(
                                project_id.clone(),
                                MutationKind::ToggleLike {
                                    post_id,
                                    previous: Some(previous),
                                },
                                snapshot,
                            )
                        }
                        _ => {
                            debug!(
                                project_id = %project_id,
                                post_id = %post_id,
                                "like target not cached; nothing to apply"
                            );
                            PendingMutation::new(
                                project_id.clone(),
                                MutationKind::ToggleLike {
                                    post_id,
                                    previous: None,
                                },
                                CacheSnapshot::Untouched,
                            )
                        }
                    }
                }
            }
        };

        debug!(
            project_id = %project_id,
            update_id = %pending.id(),
            "applied optimistic mutation"
        );
        self.notify(project_id, FeedChange::OptimisticApplied(pending.id().clone()));
        pending
    }

    async fn settle_insert(&self, pending: &PendingMutation, confirmed: Post) {
        let Some(temp_id) = pending.temp_post_id() else {
            return;
        };
        let project_id = pending.project_id();
        {
            let mut partitions = self.partitions.write().await;
            let Some(entry) = partitions.get_mut(project_id) else {
                return;
            };
            entry.retain(|post| &post.id != temp_id);
            if !entry.iter().any(|post| post.id == confirmed.id) {
                entry.push(confirmed);
            }
            entry.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        self.notify(project_id, FeedChange::Replaced);
    }

    async fn commit(&self, pending: PendingMutation, authoritative: Vec<Post>) {
        let update_id = pending.id().clone();
        let (project_id, _, _) = pending.into_parts();
        let entries = Self::normalize(&project_id, authoritative);
        {
            let mut partitions = self.partitions.write().await;
            partitions.insert(project_id.clone(), entries);
        }
        debug!(project_id = %project_id, update_id = %update_id, "committed mutation");
        self.notify(&project_id, FeedChange::Committed(update_id));
    }

    async fn settle(&self, pending: PendingMutation) {
        let update_id = pending.id().clone();
        let (project_id, _, _) = pending.into_parts();
        debug!(project_id = %project_id, update_id = %update_id, "settled mutation in place");
        self.notify(&project_id, FeedChange::Committed(update_id));
    }

    async fn rollback(&self, pending: PendingMutation) {
        let update_id = pending.id().clone();
        let (project_id, kind, snapshot) = pending.into_parts();
        {
            let mut partitions = self.partitions.write().await;
            match self.rollback_strategy {
                RollbackStrategy::Snapshot => {
                    Self::restore_snapshot(&mut partitions, &project_id, snapshot)
                }
                RollbackStrategy::Diff => Self::revert_diff(&mut partitions, &project_id, kind),
            }
        }
        debug!(
            project_id = %project_id,
            update_id = %update_id,
            strategy = ?self.rollback_strategy,
            "rolled back mutation"
        );
        self.notify(&project_id, FeedChange::RolledBack(update_id));
    }

    async fn invalidate(&self, project_id: &ProjectId) {
        let removed = {
            let mut partitions = self.partitions.write().await;
            partitions.remove(project_id).is_some()
        };
        if removed {
            self.notify(project_id, FeedChange::Invalidated);
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<FeedCacheEvent> {
        self.events.subscribe()
    }
}
