//! Outcome - dump の終了状態と Run 1 回分の結果

use std::fmt;

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

/// dump ツール 1 回分の終了状態
///
/// dump の終わり方はすべてこの 3 つのどれかに畳み込む。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpStatus {
    /// 終了コード 0
    Succeeded,

    /// 0 以外の終了コードで終了
    Exited(i32),

    /// 起動できなかった / wait に失敗した / シグナルで殺された
    Aborted(String),
}

impl DumpStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for DumpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::Exited(code) => write!(f, "exited with code {code}"),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// 通知に必要な Run の結果（永続化はしない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub started_at: DateTime<Tz>,
    pub elapsed: TimeDelta,

    /// 成功時のみ。artifact のバイト数
    pub size: Option<u64>,
}

impl RunOutcome {
    pub fn success(started_at: DateTime<Tz>, finished_at: DateTime<Tz>, size: u64) -> Self {
        Self {
            success: true,
            elapsed: finished_at - started_at,
            started_at,
            size: Some(size),
        }
    }

    pub fn failure(started_at: DateTime<Tz>, finished_at: DateTime<Tz>) -> Self {
        Self {
            success: false,
            elapsed: finished_at - started_at,
            started_at,
            size: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn outcome_measures_elapsed_between_start_and_finish() {
        let start = chrono_tz::UTC.with_ymd_and_hms(2024, 3, 1, 14, 5, 30).unwrap();
        let finish = start + TimeDelta::seconds(90);

        let ok = RunOutcome::success(start, finish, 42);
        assert!(ok.success);
        assert_eq!(ok.elapsed, TimeDelta::seconds(90));
        assert_eq!(ok.size, Some(42));

        let failed = RunOutcome::failure(start, finish);
        assert!(!failed.success);
        assert_eq!(failed.size, None);
    }

    #[test]
    fn dump_status_display() {
        assert_eq!(DumpStatus::Exited(2).to_string(), "exited with code 2");
        assert!(DumpStatus::Succeeded.is_success());
        assert!(!DumpStatus::Aborted("no such file".into()).is_success());
    }
}
