pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{
    FeedService, LikeAction, MutationCoordinator, MutationError, PersistedSelection,
    ProjectSelection, ProjectService,
};
pub use shared::{AppConfig, AppError};
pub use state::AppState;

/// ログ設定の初期化
///
/// `RUST_LOG` がなければ `anitrack=debug,info` を使う。既に初期化済みなら何もしない。
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anitrack=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
