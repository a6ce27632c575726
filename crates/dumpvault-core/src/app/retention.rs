//! Retention - 期限切れバックアップの削除
//!
//! # フロー
//! 1. prefix `backup` で一覧を取る（サーバ側での絞り込みはヒント扱い）
//! 2. キーが `backup` で始まるものだけを候補にする
//! 3. cutoff = now - ttl より厳密に古いものを削除する（ちょうど cutoff は残す）
//! 4. 1 件の削除失敗で止めず、全件試してから失敗をまとめて返す

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{BACKUP_KEY_PREFIX, SweepError, is_backup_key};
use crate::ports::ArtifactStore;

/// sweep の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: Vec<String>,

    /// 削除したオブジェクトの合計バイト数
    pub freed_bytes: u64,

    /// prefix に合致したが期限内だったもの
    pub retained: usize,

    /// 一覧には出たが prefix に合致しなかったもの（触らない）
    pub ignored: usize,
}

/// `ttl` より古い backup オブジェクトを削除する
///
/// ttl が表現できないほど大きい場合は何も削除しない。
pub async fn sweep_expired(
    store: &dyn ArtifactStore,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<SweepReport, SweepError> {
    let cutoff = TimeDelta::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_sub_signed(ttl));

    let listed = store
        .list_prefixed(BACKUP_KEY_PREFIX)
        .await
        .map_err(SweepError::List)?;

    let mut report = SweepReport::default();
    let mut expired = Vec::new();
    for object in listed {
        if !is_backup_key(&object.key) {
            report.ignored += 1;
            continue;
        }
        match cutoff {
            Some(cutoff) if object.last_modified < cutoff => expired.push(object),
            _ => report.retained += 1,
        }
    }

    let attempted = expired.len();
    let mut failures = Vec::new();
    for object in expired {
        tracing::debug!(key = %object.key, last_modified = %object.last_modified, "deleting expired backup");
        match store.delete(&object.key).await {
            Ok(()) => {
                report.freed_bytes += object.size;
                report.deleted.push(object.key);
            }
            Err(err) => {
                tracing::warn!(key = %object.key, error = %err, "failed to delete expired backup");
                failures.push((object.key, err));
            }
        }
    }

    if !failures.is_empty() {
        return Err(SweepError::Delete {
            attempted,
            failures,
        });
    }

    tracing::info!(
        deleted = report.deleted.len(),
        freed_bytes = report.freed_bytes,
        retained = report.retained,
        "retention sweep finished"
    );
    Ok(report)
}
