#![allow(dead_code)]

use anitrack::application::ports::{FeedGateway, IdentityProvider, ProjectDirectory};
use anitrack::domain::{
    Author, CurrentUser, LikeSummary, Post, PostContent, PostId, PostType, Project, ProjectId,
    UserId,
};
use anitrack::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

pub fn user_id(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn project_id(id: &str) -> ProjectId {
    ProjectId::new(id.to_string()).unwrap()
}

pub fn post_id(id: &str) -> PostId {
    PostId::new(id.to_string()).unwrap()
}

pub fn sample_user() -> CurrentUser {
    CurrentUser::new(user_id("user-1"), "mika@example.com".into())
        .with_profile(Some("Mika".into()), Some("https://cdn.example.com/mika.png".into()))
}

pub fn sample_project(id: &str) -> Project {
    Project::new(project_id(id), id.to_uppercase(), user_id("owner"))
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: PostId,
    project_id: ProjectId,
    content: PostContent,
    created_at: DateTime<Utc>,
    author: Author,
}

/// ホスト型バックエンドのインメモリ版
#[derive(Default)]
pub struct InMemoryBackend {
    projects: Mutex<Vec<Project>>,
    posts: Mutex<Vec<StoredPost>>,
    likes: Mutex<HashSet<(PostId, UserId)>>,
    next_id: AtomicUsize,
    fail_writes: AtomicBool,
    fail_fetches: AtomicBool,
    fetch_calls: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_projects(&self, projects: Vec<Project>) {
        *self.projects.lock().await = projects;
    }

    pub async fn seed_post(&self, id: &str, project: &str, created_at: DateTime<Utc>) {
        let author = CurrentUser::new(user_id("author-2"), "ren@example.com".into()).to_author();
        self.posts.lock().await.push(StoredPost {
            id: post_id(id),
            project_id: project_id(project),
            content: PostContent::new(PostType::Update, format!("post {id}")),
            created_at,
            author,
        });
    }

    pub async fn like_count(&self, post: &PostId) -> usize {
        self.likes
            .lock()
            .await
            .iter()
            .filter(|(liked, _)| liked == post)
            .count()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedGateway for InMemoryBackend {
    async fn fetch_posts(
        &self,
        project_id: &ProjectId,
        viewer: &UserId,
    ) -> Result<Vec<Post>, AppError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(AppError::Network("fetch timed out".into()));
        }
        let likes = self.likes.lock().await;
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .await
            .iter()
            .filter(|stored| &stored.project_id == project_id)
            .map(|stored| {
                let count = likes.iter().filter(|(id, _)| id == &stored.id).count() as u32;
                let viewer_has_liked = likes.contains(&(stored.id.clone(), viewer.clone()));
                Post {
                    id: stored.id.clone(),
                    project_id: stored.project_id.clone(),
                    content: stored.content.clone(),
                    created_at: stored.created_at,
                    author_id: stored.author.id.clone(),
                    author: stored.author.clone(),
                    like_summary: LikeSummary::new(count, viewer_has_liked),
                }
            })
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn insert_post(
        &self,
        project_id: &ProjectId,
        author_id: &UserId,
        content: &PostContent,
    ) -> Result<Post, AppError> {
        self.check_write()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let author = if author_id == &sample_user().id {
            sample_user().to_author()
        } else {
            CurrentUser::new(author_id.clone(), String::new()).to_author()
        };
        let stored = StoredPost {
            id: post_id(&format!("srv-{n}")),
            project_id: project_id.clone(),
            content: content.clone(),
            created_at: Utc::now(),
            author,
        };
        self.posts.lock().await.push(stored.clone());
        Ok(Post {
            id: stored.id,
            project_id: stored.project_id,
            content: stored.content,
            created_at: stored.created_at,
            author_id: stored.author.id.clone(),
            author: stored.author,
            like_summary: LikeSummary::default(),
        })
    }

    async fn insert_like(&self, post_id: &PostId, user_id: &UserId) -> Result<(), AppError> {
        self.check_write()?;
        self.likes
            .lock()
            .await
            .insert((post_id.clone(), user_id.clone()));
        Ok(())
    }

    async fn remove_like(&self, post_id: &PostId, user_id: &UserId) -> Result<(), AppError> {
        self.check_write()?;
        self.likes
            .lock()
            .await
            .remove(&(post_id.clone(), user_id.clone()));
        Ok(())
    }
}

#[async_trait]
impl ProjectDirectory for InMemoryBackend {
    async fn fetch_projects(&self) -> Result<Vec<Project>, AppError> {
        Ok(self.projects.lock().await.clone())
    }
}

/// 差し替え可能なセッション
pub struct StaticIdentity {
    user: Mutex<Option<CurrentUser>>,
}

impl StaticIdentity {
    pub fn signed_in(user: CurrentUser) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: Mutex::new(None),
        }
    }

    pub async fn sign_out(&self) {
        *self.user.lock().await = None;
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Option<CurrentUser> {
        self.user.lock().await.clone()
    }
}
