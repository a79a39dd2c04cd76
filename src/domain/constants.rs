/// 選択中プロジェクトを永続化するキー
pub const SELECTED_PROJECT_STORAGE_KEY: &str = "anitrack_selected_project";

/// 楽観的挿入した投稿の仮IDに付けるプレフィックス
pub const TEMPORARY_POST_ID_PREFIX: &str = "temp-";
