use crate::application::ports::key_value_store::KeyValueStore;
use crate::shared::error::AppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

/// 復元に失敗した理由。呼び出し側には返さず未選択として扱う
#[derive(Debug, Error)]
pub enum SelectionLoadError {
    #[error("failed to read persisted selection: {0}")]
    Storage(#[source] AppError),
    #[error("persisted selection is corrupt: {0}")]
    CorruptPersistedState(#[source] serde_json::Error),
}

enum Slot<T> {
    Unloaded,
    Loaded(Option<T>),
}

/// 1つの値を保持し、永続ストアへミラーする選択ストア
///
/// 最初のアクセスで永続ストアから復元する。`Arc` で共有した全ての保持者が
/// 同じ値を見る。
pub struct PersistedSelection<T> {
    key: String,
    store: Arc<dyn KeyValueStore>,
    slot: Mutex<Slot<T>>,
    changes: watch::Sender<Option<T>>,
}

impl<T> PersistedSelection<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(key: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            key: key.into(),
            store,
            slot: Mutex::new(Slot::Unloaded),
            changes,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 現在の値。未ロードなら永続ストアから復元する
    pub async fn get(&self) -> Option<T> {
        let mut slot = self.slot.lock().await;
        self.ensure_loaded(&mut slot).await
    }

    /// 値を更新して永続ストアへ書き出す。`None` ならエントリを削除する
    ///
    /// 書き出しに失敗してもメモリ上の値は更新したままにする。
    pub async fn set(&self, value: Option<T>) {
        let mut slot = self.slot.lock().await;
        self.persist(value.as_ref()).await;
        *slot = Slot::Loaded(value.clone());
        self.changes.send_replace(value);
    }

    /// 未選択のときだけ `value` を設定する
    ///
    /// 結果の値と、今回設定したかどうかを返す。
    pub async fn set_if_unset(&self, value: T) -> (T, bool) {
        let mut slot = self.slot.lock().await;
        if let Some(current) = self.ensure_loaded(&mut slot).await {
            return (current, false);
        }
        self.persist(Some(&value)).await;
        *slot = Slot::Loaded(Some(value.clone()));
        self.changes.send_replace(Some(value.clone()));
        (value, true)
    }

    /// 値の変化を購読する
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.changes.subscribe()
    }

    async fn ensure_loaded(&self, slot: &mut Slot<T>) -> Option<T> {
        if let Slot::Loaded(value) = slot {
            return value.clone();
        }
        let value = match self.rehydrate().await {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %self.key, error = %err, "treating persisted selection as unset");
                None
            }
        };
        self.changes.send_replace(value.clone());
        *slot = Slot::Loaded(value.clone());
        value
    }

    async fn rehydrate(&self) -> Result<Option<T>, SelectionLoadError> {
        let raw = self
            .store
            .get(&self.key)
            .await
            .map_err(SelectionLoadError::Storage)?;
        let Some(raw) = raw else {
            debug!(key = %self.key, "no persisted selection");
            return Ok(None);
        };
        serde_json::from_str::<Option<T>>(&raw).map_err(SelectionLoadError::CorruptPersistedState)
    }

    async fn persist(&self, value: Option<&T>) {
        let result = match value {
            Some(value) => match serde_json::to_string(value) {
                Ok(json) => self.store.set(&self.key, &json).await,
                Err(err) => Err(AppError::from(err)),
            },
            None => self.store.remove(&self.key).await,
        };
        if let Err(err) = result {
            warn!(key = %self.key, error = %err, "failed to persist selection");
        }
    }
}
