//! Notifier port - オペレータへの通知
//!
//! # 実装
//! - TelegramNotifier（Bot API）
//! - NoopNotifier（認証情報がないとき）

use async_trait::async_trait;

use crate::domain::NotifyError;

/// Notifier はメッセージを 1 通送る。リトライも配送確認もしない。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
