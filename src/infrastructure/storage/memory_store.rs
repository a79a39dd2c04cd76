use crate::application::ports::key_value_store::KeyValueStore;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// プロセス内のキーバリューストア。クローン同士は同じ中身を共有する
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}
