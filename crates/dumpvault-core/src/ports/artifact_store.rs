//! ArtifactStore port - バックアップの保存先（S3 互換ストレージ / InMemory）
//!
//! # 実装
//! - `impls::ObjectArtifactStore`: object_store 経由の S3 互換ストレージ
//! - `impls::InMemoryArtifactStore`: テスト・開発用

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::StoreError;

/// 保存済みオブジェクトのメタ情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

/// ArtifactStore は dump artifact を保存・列挙・削除する
///
/// # 設計原則
/// - `list_prefixed` はサーバ側で絞り込むためのヒントとして prefix を使う。
///   返り値に prefix 外のキーが混ざることがあるので、呼び出し側で必ずフィルタする
/// - 空の bucket は空の Vec（エラーではない）
/// - 存在しないキーの delete は成功扱い
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn list_prefixed(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError>;

    /// ローカルファイルを `key` としてアップロードし、送ったバイト数を返す
    async fn upload_file(&self, key: &str, path: &Path) -> Result<u64, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
