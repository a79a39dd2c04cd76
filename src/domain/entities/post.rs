use super::user::Author;
use crate::domain::value_objects::{PostId, ProjectId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    Update,
    Announcement,
    Milestone,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Update => "update",
            PostType::Announcement => "announcement",
            PostType::Milestone => "milestone",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "update" => Ok(PostType::Update),
            "announcement" => Ok(PostType::Announcement),
            "milestone" => Ok(PostType::Milestone),
            other => Err(format!("Unknown post type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub message: String,
}

impl PostContent {
    pub fn new(post_type: PostType, message: impl Into<String>) -> Self {
        Self {
            post_type,
            message: message.into(),
        }
    }
}

/// 閲覧者から見たいいねの集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LikeSummary {
    pub count: u32,
    pub viewer_has_liked: bool,
}

impl LikeSummary {
    pub fn new(count: u32, viewer_has_liked: bool) -> Self {
        Self {
            count,
            viewer_has_liked,
        }
    }

    /// いいね状態を反転し、件数を ±1 する（0 未満にはしない）
    pub fn toggled(self) -> Self {
        if self.viewer_has_liked {
            Self {
                count: self.count.saturating_sub(1),
                viewer_has_liked: false,
            }
        } else {
            Self {
                count: self.count.saturating_add(1),
                viewer_has_liked: true,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub project_id: ProjectId,
    pub content: PostContent,
    pub created_at: DateTime<Utc>,
    pub author_id: UserId,
    pub author: Author,
    #[serde(default)]
    pub like_summary: LikeSummary,
}

impl Post {
    /// サーバー確定前にフィードへ差し込む仮の投稿
    pub fn optimistic(project_id: ProjectId, author: Author, content: PostContent) -> Self {
        Self {
            id: PostId::temporary(),
            project_id,
            content,
            created_at: Utc::now(),
            author_id: author.id.clone(),
            author,
            like_summary: LikeSummary::default(),
        }
    }

    pub fn is_optimistic(&self) -> bool {
        self.id.is_temporary()
    }

    pub fn toggle_like(&mut self) {
        self.like_summary = self.like_summary.toggled();
    }
}
