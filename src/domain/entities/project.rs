use crate::domain::value_objects::{ProjectId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ワークスペース。一覧取得元が所有し、このクレートからは書き換えない
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub short_name: String,
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub thumb: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub added_by: UserId,
    #[serde(default)]
    pub modified_by: Option<UserId>,
}

impl Project {
    pub fn new(id: ProjectId, short_name: String, added_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            short_name,
            long_name: String::new(),
            thumb: None,
            created_at: now,
            updated_at: now,
            added_by,
            modified_by: None,
        }
    }

    pub fn with_long_name(mut self, long_name: String) -> Self {
        self.long_name = long_name;
        self
    }
}
