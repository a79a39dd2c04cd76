use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ロールバック時にキャッシュをどう戻すか
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RollbackStrategy {
    /// 変更前のパーティションをそのまま復元する
    #[default]
    Snapshot,
    /// 自分が加えた変更だけを取り消す
    Diff,
}

impl RollbackStrategy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Some(Self::Snapshot),
            "diff" => Some(Self::Diff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub rollback_strategy: RollbackStrategy,
    pub reconcile_after_commit: bool,
    pub event_buffer: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.push("anitrack");
        Self { data_dir }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rollback_strategy: RollbackStrategy::Snapshot,
            reconcile_after_commit: true,
            event_buffer: 64,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// キー名から値を引く関数を受け取って設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("ANITRACK_DATA_DIR") {
            if !v.trim().is_empty() {
                cfg.storage.data_dir = PathBuf::from(v.trim());
            }
        }
        if let Some(strategy) = lookup("ANITRACK_ROLLBACK_STRATEGY")
            .as_deref()
            .and_then(RollbackStrategy::parse)
        {
            cfg.feed.rollback_strategy = strategy;
        }
        if let Some(v) = lookup("ANITRACK_RECONCILE_AFTER_COMMIT") {
            cfg.feed.reconcile_after_commit = parse_bool(&v, cfg.feed.reconcile_after_commit);
        }
        if let Some(value) = lookup("ANITRACK_FEED_EVENT_BUFFER")
            .as_deref()
            .and_then(parse_usize)
        {
            cfg.feed.event_buffer = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err("Storage data_dir must not be empty".to_string());
        }
        if self.feed.event_buffer == 0 {
            return Err("Feed event_buffer must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}
