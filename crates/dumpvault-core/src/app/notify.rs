//! Notify - 結果メッセージの組み立てと送信
//!
//! 通知は best-effort。失敗はログに出すだけで Run の結果は変えない。

use crate::domain::{RunOutcome, format_elapsed, format_size};
use crate::ports::Notifier;

/// 通知本文を組み立てる
///
/// 成功時は経過時間とサイズ、失敗時は経過時間のみ。
pub fn compose_message(outcome: &RunOutcome) -> String {
    let took = format_elapsed(outcome.elapsed);
    match (outcome.success, outcome.size) {
        (true, Some(size)) => format!(
            "📦 Backup is done! ✅\n\nTook: {took}\nSize: {}\n",
            format_size(size)
        ),
        (true, None) => format!("📦 Backup is done! ✅\n\nTook: {took}\n"),
        (false, _) => {
            format!("📦 Backup error! ❌\n\nTook: {took}\n\nCheck the logs for error details.\n")
        }
    }
}

/// 通知を送り、送れたかどうかを返す
pub async fn deliver(notifier: &dyn Notifier, outcome: &RunOutcome) -> bool {
    let text = compose_message(outcome);
    match notifier.send(&text).await {
        Ok(()) => {
            tracing::debug!(success = outcome.success, "notification sent");
            true
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to deliver notification");
            false
        }
    }
}
