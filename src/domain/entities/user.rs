use crate::domain::value_objects::UserId;
use serde::{Deserialize, Serialize};

const ANONYMOUS_LABEL: &str = "Anonymous";

/// ログイン中のユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl CurrentUser {
    pub fn new(id: UserId, email: String) -> Self {
        Self {
            id,
            email,
            display_name: None,
            avatar_url: None,
        }
    }

    pub fn with_profile(mut self, display_name: Option<String>, avatar_url: Option<String>) -> Self {
        self.display_name = display_name;
        self.avatar_url = avatar_url;
        self
    }

    pub fn to_author(&self) -> Author {
        Author {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// 投稿に埋め込まれる投稿者の表示用スナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Author {
    /// 表示名 → メールのローカル部 → "Anonymous" の順で決める
    pub fn display_label(&self) -> String {
        if let Some(name) = self.display_name.as_deref() {
            if !name.trim().is_empty() {
                return name.to_string();
            }
        }
        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => ANONYMOUS_LABEL.to_string(),
        }
    }

    /// アバター画像がないときに使う頭文字
    pub fn initial(&self) -> String {
        self.display_label()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "A".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(email: &str, display_name: Option<&str>) -> Author {
        Author {
            id: UserId::new("u1".into()).unwrap(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            avatar_url: None,
        }
    }

    #[test]
    fn label_prefers_display_name() {
        assert_eq!(author("mika@example.com", Some("Mika")).display_label(), "Mika");
    }

    #[test]
    fn label_falls_back_to_email_local_part() {
        assert_eq!(author("mika@example.com", None).display_label(), "mika");
        assert_eq!(author("mika@example.com", Some("  ")).display_label(), "mika");
    }

    #[test]
    fn label_falls_back_to_anonymous() {
        let anon = author("", None);
        assert_eq!(anon.display_label(), "Anonymous");
        assert_eq!(anon.initial(), "A");
    }

    #[test]
    fn initial_is_uppercased() {
        assert_eq!(author("zed@example.com", None).initial(), "Z");
    }
}
