//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **ObjectArtifactStore**: object_store 経由の S3 互換ストレージ
//! - **InMemoryArtifactStore**: 開発・テスト用の保存先
//! - **ProcessDumpRunner**: dump ツールを子プロセスで実行
//! - **LogForwarder**: 子プロセスの出力をログに流す
//! - **TelegramNotifier** / **NoopNotifier**

pub mod inmem_store;
pub mod log_forward;
pub mod noop;
pub mod process;
pub mod s3_store;
pub mod telegram;

use std::sync::Arc;

use crate::domain::{NotifyError, TelegramConfig};
use crate::ports::Notifier;

// 主要な型を再エクスポート
pub use self::inmem_store::InMemoryArtifactStore;
pub use self::log_forward::LogForwarder;
pub use self::noop::NoopNotifier;
pub use self::process::{ProcessDumpRunner, run_command};
pub use self::s3_store::ObjectArtifactStore;
pub use self::telegram::TelegramNotifier;

/// 認証情報があれば TelegramNotifier、なければ NoopNotifier
pub fn notifier_from_config(
    config: Option<&TelegramConfig>,
) -> Result<Arc<dyn Notifier>, NotifyError> {
    match config {
        Some(config) => Ok(Arc::new(TelegramNotifier::new(config)?)),
        None => Ok(Arc::new(NoopNotifier)),
    }
}
