use crate::domain::entities::Project;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// 並び順は呼び出し側で変えない
    async fn fetch_projects(&self) -> Result<Vec<Project>, AppError>;
}
