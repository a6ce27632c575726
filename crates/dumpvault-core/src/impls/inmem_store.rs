//! InMemoryArtifactStore - 開発・テスト用の保存先
//!
//! # 学習ポイント
//! - prefix 以上のキーを全部返す（prefix 外も混ざるので呼び出し側のフィルタを試せる）
//! - last_modified を任意の時刻で入れられるので retention の境界をテストできる
//! - 障害注入（list 失敗 / 特定キーの delete 失敗）

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::domain::StoreError;
use crate::ports::{ArtifactStore, Clock, StoredObject};

#[derive(Debug, Clone)]
struct Blob {
    last_modified: DateTime<Utc>,
    data: Bytes,
}

#[derive(Default)]
struct Faults {
    fail_listing: bool,
    fail_uploads: bool,
    failing_deletes: HashSet<String>,
}

/// InMemoryArtifactStore は BTreeMap にオブジェクトを保持する
///
/// # 使用例
/// ```ignore
/// let store = InMemoryArtifactStore::new(clock.clone());
/// store.insert("backup-2020-01-01-00-00", old, Bytes::from_static(b"x"));
/// ```
pub struct InMemoryArtifactStore {
    clock: Arc<dyn Clock>,
    objects: Mutex<BTreeMap<String, Blob>>,
    faults: Mutex<Faults>,
}

impl InMemoryArtifactStore {
    /// アップロード時の last_modified には `clock` の現在時刻を使う
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            objects: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(Faults::default()),
        }
    }

    pub fn insert(&self, key: impl Into<String>, last_modified: DateTime<Utc>, data: Bytes) {
        self.objects().insert(
            key.into(),
            Blob {
                last_modified,
                data,
            },
        );
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects().get(key).map(|blob| blob.data.clone())
    }

    pub fn fail_listing(&self) {
        self.faults().fail_listing = true;
    }

    pub fn fail_uploads(&self) {
        self.faults().fail_uploads = true;
    }

    pub fn fail_delete_of(&self, key: impl Into<String>) {
        self.faults().failing_deletes.insert(key.into());
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, Blob>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn list_prefixed(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError> {
        if self.faults().fail_listing {
            return Err(StoreError::Other("listing is unavailable".to_string()));
        }
        let objects = self
            .objects()
            .iter()
            .filter(|(key, _)| key.as_str() >= prefix)
            .map(|(key, blob)| StoredObject {
                key: key.clone(),
                last_modified: blob.last_modified,
                size: blob.data.len() as u64,
            })
            .collect();
        Ok(objects)
    }

    async fn upload_file(&self, key: &str, path: &Path) -> Result<u64, StoreError> {
        if self.faults().fail_uploads {
            return Err(StoreError::Other("upload rejected".to_string()));
        }
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let size = data.len() as u64;
        self.insert(key, self.clock.now(), Bytes::from(data));
        Ok(size)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        if self.faults().failing_deletes.contains(key) {
            return Err(StoreError::Other(format!("access denied for {key}")));
        }
        self.objects().remove(key);
        Ok(())
    }
}
