use super::project_selection::ProjectSelection;
use crate::application::ports::identity::IdentityProvider;
use crate::application::ports::project_directory::ProjectDirectory;
use crate::domain::entities::Project;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::debug;

pub struct ProjectService {
    selection: ProjectSelection,
    directory: Arc<dyn ProjectDirectory>,
    identity: Arc<dyn IdentityProvider>,
}

impl ProjectService {
    pub fn new(
        selection: ProjectSelection,
        directory: Arc<dyn ProjectDirectory>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            selection,
            directory,
            identity,
        }
    }

    /// プロジェクト一覧を取り直し、自動選択を走らせる
    ///
    /// 未ログインなら取得せずに空を返す。
    pub async fn refresh_projects(&self) -> Result<Vec<Project>, AppError> {
        if self.identity.current_user().await.is_none() {
            debug!("no signed-in user; skipping project fetch");
            return Ok(Vec::new());
        }
        let projects = self.directory.fetch_projects().await?;
        debug!(count = projects.len(), "projects loaded");
        self.selection.on_projects_loaded(&projects).await;
        Ok(projects)
    }

    pub fn selection(&self) -> &ProjectSelection {
        &self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CurrentUser;
    use crate::domain::value_objects::{ProjectId, UserId};
    use crate::infrastructure::storage::MemoryKeyValueStore;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Directory {}

        #[async_trait]
        impl ProjectDirectory for Directory {
            async fn fetch_projects(&self) -> Result<Vec<Project>, AppError>;
        }
    }

    mock! {
        pub Identity {}

        #[async_trait]
        impl IdentityProvider for Identity {
            async fn current_user(&self) -> Option<CurrentUser>;
        }
    }

    fn owner() -> UserId {
        UserId::new("owner".into()).unwrap()
    }

    fn project(id: &str) -> Project {
        Project::new(ProjectId::new(id.to_string()).unwrap(), id.to_uppercase(), owner())
    }

    fn signed_in() -> MockIdentity {
        let mut identity = MockIdentity::new();
        identity
            .expect_current_user()
            .returning(|| Some(CurrentUser::new(owner(), "owner@example.com".into())));
        identity
    }

    fn build(directory: MockDirectory, identity: MockIdentity) -> ProjectService {
        ProjectService::new(
            ProjectSelection::new(Arc::new(MemoryKeyValueStore::new())),
            Arc::new(directory),
            Arc::new(identity),
        )
    }

    #[tokio::test]
    async fn test_refresh_without_user_skips_fetch() {
        let mut directory = MockDirectory::new();
        directory.expect_fetch_projects().times(0);
        let mut identity = MockIdentity::new();
        identity.expect_current_user().returning(|| None);
        let service = build(directory, identity);

        assert!(service.refresh_projects().await.unwrap().is_empty());
        assert_eq!(service.selection().get_selected().await, None);
    }

    #[tokio::test]
    async fn test_refresh_selects_first_project_in_given_order() {
        let mut directory = MockDirectory::new();
        directory
            .expect_fetch_projects()
            .times(1)
            .returning(|| Ok(vec![project("c"), project("a"), project("b")]));
        let service = build(directory, signed_in());

        let projects = service.refresh_projects().await.unwrap();

        assert_eq!(projects.len(), 3);
        let selected = service.selection().selected_project_id().await;
        assert_eq!(selected.map(|id| id.to_string()), Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_error_leaves_selection_alone() {
        let mut directory = MockDirectory::new();
        directory
            .expect_fetch_projects()
            .returning(|| Err(AppError::Network("offline".into())));
        let service = build(directory, signed_in());

        assert!(matches!(
            service.refresh_projects().await,
            Err(AppError::Network(_))
        ));
        assert_eq!(service.selection().get_selected().await, None);
    }
}
