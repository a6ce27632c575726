//! NoopNotifier - 通知先が設定されていないときの Notifier

use async_trait::async_trait;

use crate::domain::NotifyError;
use crate::ports::Notifier;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, _text: &str) -> Result<(), NotifyError> {
        tracing::debug!("notification credentials are not configured; skipping notification");
        Ok(())
    }
}
