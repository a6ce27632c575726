//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてバックアップの手順を実装します。
//!
//! # 主要コンポーネント
//! - **BackupRun**: dump → sweep → upload → notify のオーケストレーション
//! - **sweep_expired**: 期限切れバックアップの削除
//! - **upload_artifact**: timestamp 由来のキーでアップロード
//! - **compose_message / deliver**: 通知本文の組み立てと送信

pub mod backup;
pub mod notify;
pub mod retention;
pub mod upload;

// 主要な型を再エクスポート
pub use self::backup::{BackupRun, LocalArtifact, RunReport, RunSettings};
pub use self::notify::{compose_message, deliver};
pub use self::retention::{SweepReport, sweep_expired};
pub use self::upload::{Uploaded, upload_artifact};
