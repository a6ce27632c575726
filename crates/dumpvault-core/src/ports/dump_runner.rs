//! DumpRunner port - データベースの dump を取る

use std::path::Path;

use async_trait::async_trait;

use crate::domain::DumpStatus;

/// DumpRunner は `dest` に dump を書き出す
///
/// 失敗はすべて `DumpStatus` に畳み込まれる（Result ではない）。
#[async_trait]
pub trait DumpRunner: Send + Sync {
    async fn dump(&self, dest: &Path) -> DumpStatus;
}
