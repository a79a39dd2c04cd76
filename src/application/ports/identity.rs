use crate::domain::entities::CurrentUser;
use async_trait::async_trait;

/// 認証プロバイダ。セッションがなければ `None`
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Option<CurrentUser>;
}
