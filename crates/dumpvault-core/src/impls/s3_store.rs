//! ObjectArtifactStore - object_store 上の ArtifactStore
//!
//! 本番では `AmazonS3Builder` で S3 互換ストレージに接続する。
//! テストでは `object_store::memory::InMemory` を差し込める。

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{TryStreamExt, future};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore, WriteMultipart};
use tokio::io::AsyncReadExt;

use crate::domain::{StoreConfig, StoreError};
use crate::ports::{ArtifactStore, StoredObject};

/// 1 part あたりのサイズ（S3 の最小 part サイズ 5 MiB より大きく）
pub const UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// 同時にアップロード中にしておく part 数の上限
const MAX_IN_FLIGHT_PARTS: usize = 4;

#[derive(Debug, Clone)]
pub struct ObjectArtifactStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectArtifactStore {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// S3 互換ストレージに接続する
    ///
    /// http の endpoint（ローカルの MinIO など）も許可する。
    pub fn s3(config: &StoreConfig) -> Result<Self, object_store::Error> {
        let endpoint = config.endpoint.as_str().trim_end_matches('/');
        let store = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_endpoint(endpoint)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(config.secret_access_key.expose())
            .with_allow_http(config.endpoint.scheme() == "http")
            .build()?;
        Ok(Self::new(Arc::new(store), config.bucket.clone()))
    }
}

impl From<ObjectMeta> for StoredObject {
    fn from(meta: ObjectMeta) -> Self {
        Self {
            key: meta.location.to_string(),
            last_modified: meta.last_modified,
            size: meta.size,
        }
    }
}

#[async_trait]
impl ArtifactStore for ObjectArtifactStore {
    /// S3 には `start-after=<prefix>` として送られる
    ///
    /// S3 はキー順に返すので、prefix に合致しないキーが出た時点で打ち切る。
    /// start-after は prefix と完全一致するキー自体を返さないため、それだけ head で補う。
    async fn list_prefixed(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError> {
        let location = ObjectPath::from(prefix);
        let mut objects = match self.store.head(&location).await {
            Ok(meta) => vec![meta],
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let listed: Vec<ObjectMeta> = self
            .store
            .list_with_offset(None, &location)
            .try_take_while(|meta| future::ready(Ok(meta.location.as_ref().starts_with(prefix))))
            .try_collect()
            .await?;
        objects.extend(listed);

        tracing::debug!(bucket = %self.bucket, prefix, count = objects.len(), "listed objects");
        Ok(objects.into_iter().map(StoredObject::from).collect())
    }

    async fn upload_file(&self, key: &str, path: &Path) -> Result<u64, StoreError> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let location = ObjectPath::from(key);
        let upload = self.store.put_multipart(&location).await?;
        let mut writer = WriteMultipart::new_with_chunk_size(upload, UPLOAD_CHUNK_SIZE);

        match copy_file(&mut file, &mut writer, path).await {
            Ok(total) => {
                writer.finish().await?;
                tracing::debug!(bucket = %self.bucket, key, bytes = total, "upload finished");
                Ok(total)
            }
            Err(err) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(key, error = %abort_err, "failed to abort multipart upload");
                }
                Err(err)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.store.delete(&ObjectPath::from(key)).await?;
        Ok(())
    }
}

async fn copy_file(
    file: &mut tokio::fs::File,
    writer: &mut WriteMultipart,
    path: &Path,
) -> Result<u64, StoreError> {
    let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buf).await.map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            return Ok(total);
        }
        writer.wait_for_capacity(MAX_IN_FLIGHT_PARTS).await?;
        writer.write(&buf[..n]);
        total += n as u64;
    }
}
