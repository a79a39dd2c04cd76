use crate::application::ports::cache::FeedCache;
use crate::application::ports::feed_gateway::FeedGateway;
use crate::application::ports::identity::IdentityProvider;
use crate::application::ports::key_value_store::KeyValueStore;
use crate::application::ports::project_directory::ProjectDirectory;
use crate::application::services::{
    FeedService, MutationCoordinator, ProjectSelection, ProjectService,
};
use crate::infrastructure::cache::FeedCacheService;
use crate::infrastructure::storage::FileKeyValueStore;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::info;

/// アプリケーション全体の状態を管理する構造体
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub selection: ProjectSelection,
    pub feed_cache: Arc<dyn FeedCache>,
    pub mutation_coordinator: Arc<MutationCoordinator>,
    pub feed_service: Arc<FeedService>,
    pub project_service: Arc<ProjectService>,
}

impl AppState {
    /// データディレクトリ配下のファイルストアを使って組み立てる
    pub fn new(
        config: AppConfig,
        feed_gateway: Arc<dyn FeedGateway>,
        project_directory: Arc<dyn ProjectDirectory>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppError> {
        let store = Arc::new(FileKeyValueStore::new(config.storage.data_dir.clone()));
        Self::with_store(config, store, feed_gateway, project_directory, identity)
    }

    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        feed_gateway: Arc<dyn FeedGateway>,
        project_directory: Arc<dyn ProjectDirectory>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let selection = ProjectSelection::new(store);
        let feed_cache: Arc<dyn FeedCache> = Arc::new(FeedCacheService::new(
            config.feed.rollback_strategy,
            config.feed.event_buffer,
        ));

        let mutation_coordinator = Arc::new(MutationCoordinator::new(
            selection.clone(),
            Arc::clone(&feed_cache),
            Arc::clone(&feed_gateway),
            Arc::clone(&identity),
            config.feed.reconcile_after_commit,
        ));
        let feed_service = Arc::new(FeedService::new(
            selection.clone(),
            Arc::clone(&feed_cache),
            feed_gateway,
            Arc::clone(&identity),
        ));
        let project_service = Arc::new(ProjectService::new(
            selection.clone(),
            project_directory,
            identity,
        ));

        info!(
            rollback_strategy = ?config.feed.rollback_strategy,
            reconcile_after_commit = config.feed.reconcile_after_commit,
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            selection,
            feed_cache,
            mutation_coordinator,
            feed_service,
            project_service,
        })
    }
}
