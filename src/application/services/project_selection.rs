use super::persisted_selection::PersistedSelection;
use crate::application::ports::key_value_store::KeyValueStore;
use crate::domain::constants::SELECTED_PROJECT_STORAGE_KEY;
use crate::domain::entities::Project;
use crate::domain::value_objects::ProjectId;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// 選択中のプロジェクト
#[derive(Clone)]
pub struct ProjectSelection {
    selection: Arc<PersistedSelection<Project>>,
}

impl ProjectSelection {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::from_selection(Arc::new(PersistedSelection::new(
            SELECTED_PROJECT_STORAGE_KEY,
            store,
        )))
    }

    pub fn from_selection(selection: Arc<PersistedSelection<Project>>) -> Self {
        Self { selection }
    }

    pub async fn get_selected(&self) -> Option<Project> {
        self.selection.get().await
    }

    pub async fn set_selected(&self, project: Option<Project>) {
        self.selection.set(project).await;
    }

    pub async fn selected_project_id(&self) -> Option<ProjectId> {
        self.get_selected().await.map(|project| project.id)
    }

    /// プロジェクト一覧が更新されたときの自動選択
    ///
    /// 未選択で一覧が空でなければ先頭を選ぶ。選択済みなら、一覧から消えていても
    /// そのまま残す。
    pub async fn on_projects_loaded(&self, projects: &[Project]) -> Option<Project> {
        let Some(first) = projects.first() else {
            return self.get_selected().await;
        };
        let (selected, applied) = self.selection.set_if_unset(first.clone()).await;
        if applied {
            info!(project_id = %selected.id, "auto-selected first project");
        }
        Some(selected)
    }

    /// 一覧からIDで選ぶ。見つからなければ選択を解除する
    pub async fn select_by_id(&self, projects: &[Project], id: &ProjectId) -> Option<Project> {
        let project = projects.iter().find(|project| &project.id == id).cloned();
        self.set_selected(project.clone()).await;
        project
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Project>> {
        self.selection.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::UserId;
    use crate::infrastructure::storage::MemoryKeyValueStore;

    fn project(id: &str) -> Project {
        Project::new(
            ProjectId::new(id.to_string()).unwrap(),
            id.to_uppercase(),
            UserId::new("owner".into()).unwrap(),
        )
    }

    fn selection_over(store: &MemoryKeyValueStore) -> ProjectSelection {
        ProjectSelection::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn first_project_is_selected_when_unset() {
        let store = MemoryKeyValueStore::new();
        let selection = selection_over(&store);
        let projects = vec![project("a"), project("b"), project("c")];

        let selected = selection.on_projects_loaded(&projects).await;

        assert_eq!(selected, Some(projects[0].clone()));
        assert_eq!(selection.get_selected().await, Some(projects[0].clone()));
        assert!(store.get(SELECTED_PROJECT_STORAGE_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn existing_selection_survives_refresh_without_it() {
        let store = MemoryKeyValueStore::new();
        let b = project("b");
        selection_over(&store).set_selected(Some(b.clone())).await;

        let restarted = selection_over(&store);
        let selected = restarted
            .on_projects_loaded(&[project("a"), project("c")])
            .await;

        assert_eq!(selected, Some(b.clone()));
        assert_eq!(restarted.get_selected().await, Some(b));
    }

    #[tokio::test]
    async fn empty_list_leaves_selection_unset() {
        let store = MemoryKeyValueStore::new();
        let selection = selection_over(&store);

        assert_eq!(selection.on_projects_loaded(&[]).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn select_by_id_clears_on_unknown_id() {
        let store = MemoryKeyValueStore::new();
        let selection = selection_over(&store);
        let projects = vec![project("a"), project("b")];

        let picked = selection.select_by_id(&projects, &projects[1].id).await;
        assert_eq!(picked.map(|p| p.id), Some(projects[1].id.clone()));

        let missing = ProjectId::new("zzz".into()).unwrap();
        assert_eq!(selection.select_by_id(&projects, &missing).await, None);
        assert_eq!(selection.get_selected().await, None);
        assert!(store.is_empty().await);
    }
}
