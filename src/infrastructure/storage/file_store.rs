use crate::application::ports::key_value_store::KeyValueStore;
use crate::shared::error::AppError;
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// データディレクトリ配下に `<key>.json` として保存する永続ストア
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn validate_key(key: &str) -> Result<(), AppError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Invalid storage key: {key:?}"
        )))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(data) => {
                debug!(path = %path.display(), "read persisted value");
                Ok(Some(data))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("failed to read {}", path.display()))
                .into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create storage directory at {:?}", self.root))?;

        // 一時ファイルに書いてからリネームで置き換える
        let tmp = self.root.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;

        debug!(path = %path.display(), "persisted value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("failed to remove {}", path.display()))
                .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        assert_eq!(store.get("selection").await.unwrap(), None);

        store.set("selection", r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            store.get("selection").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert!(dir.path().join("nested/selection.json").exists());

        store.remove("selection").await.unwrap();
        assert_eq!(store.get("selection").await.unwrap(), None);
    }

    #[tokio::test]
    async fn removing_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert!(store.remove("never_written").await.is_ok());
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        let err = store.set("../escape", "x").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn overwrite_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        store.set("k", "first").await.unwrap();
        store.set("k", "second").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
        assert!(!dir.path().join("k.json.tmp").exists());
    }
}
