use crate::domain::constants::TEMPORARY_POST_ID_PREFIX;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 投稿ID。楽観的に挿入した投稿にはクライアント側で仮IDを振る
///
/// 仮IDかどうかは生成元で決まり、文字列からは復元しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId {
    value: String,
    temporary: bool,
}

impl PostId {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Post ID cannot be empty".to_string());
        }
        Ok(Self {
            value,
            temporary: false,
        })
    }

    /// サーバー確定前の仮IDを生成
    pub fn temporary() -> Self {
        Self {
            value: format!("{TEMPORARY_POST_ID_PREFIX}{}", uuid::Uuid::new_v4()),
            temporary: true,
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for PostId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PostId> for String {
    fn from(id: PostId) -> Self {
        id.value
    }
}
