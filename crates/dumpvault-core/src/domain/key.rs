//! Key - 保存するバックアップのオブジェクトキー

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// retention が触るのはこの prefix で始まるキーだけ
pub const BACKUP_KEY_PREFIX: &str = "backup";

/// Run 開始時刻（Run のタイムゾーン）から `backup-<YYYY-MM-DD-HH-MM>` を作る
///
/// 同じ分に開始した 2 回の Run は同じキーになり、後のアップロードが上書きする。
pub fn object_key<Z>(started_at: &DateTime<Z>) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    format!(
        "{BACKUP_KEY_PREFIX}-{}",
        started_at.format("%Y-%m-%d-%H-%M")
    )
}

pub fn is_backup_key(key: &str) -> bool {
    key.starts_with(BACKUP_KEY_PREFIX)
}
