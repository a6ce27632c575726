//! Upload - dump artifact を timestamp 由来のキーで保存する

use std::path::Path;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::domain::{PostDumpError, object_key};
use crate::ports::ArtifactStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    pub key: String,
    pub size: u64,
}

/// `backup-<start time to the minute>` として artifact をアップロードする
pub async fn upload_artifact(
    store: &dyn ArtifactStore,
    path: &Path,
    started_at: &DateTime<Tz>,
) -> Result<Uploaded, PostDumpError> {
    let key = object_key(started_at);
    tracing::debug!(key = %key, path = %path.display(), "uploading dump");

    match store.upload_file(&key, path).await {
        Ok(size) => {
            tracing::info!(key = %key, size, "dump uploaded");
            Ok(Uploaded { key, size })
        }
        Err(source) => Err(PostDumpError::Upload { key, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryArtifactStore;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn start() -> DateTime<Tz> {
        chrono_tz::UTC.with_ymd_and_hms(2024, 3, 1, 14, 5, 30).unwrap()
    }

    #[tokio::test]
    async fn uploads_under_minute_key() {
        let store = InMemoryArtifactStore::new(Arc::new(FixedClock::new(Utc::now())));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.dump");
        std::fs::write(&path, vec![7u8; 1536]).unwrap();

        let uploaded = upload_artifact(&store, &path, &start()).await.unwrap();

        assert_eq!(
            uploaded,
            Uploaded {
                key: "backup-2024-03-01-14-05".to_string(),
                size: 1536
            }
        );
        assert_eq!(store.get("backup-2024-03-01-14-05").unwrap().len(), 1536);
    }

    #[tokio::test]
    async fn same_minute_overwrites() {
        let store = InMemoryArtifactStore::new(Arc::new(FixedClock::new(Utc::now())));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.dump");

        std::fs::write(&path, b"first").unwrap();
        upload_artifact(&store, &path, &start()).await.unwrap();
        std::fs::write(&path, b"second").unwrap();
        let later = start() + chrono::TimeDelta::seconds(20);
        upload_artifact(&store, &path, &later).await.unwrap();

        assert_eq!(store.keys().len(), 1);
        assert_eq!(&store.get("backup-2024-03-01-14-05").unwrap()[..], b"second");
    }

    #[tokio::test]
    async fn failure_names_the_key() {
        let store = InMemoryArtifactStore::new(Arc::new(FixedClock::new(Utc::now())));
        store.fail_uploads();

        let err = upload_artifact(&store, Path::new("backup.dump"), &start())
            .await
            .unwrap_err();

        assert!(matches!(err, PostDumpError::Upload { ref key, .. } if key == "backup-2024-03-01-14-05"));
    }
}
