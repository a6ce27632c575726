//! Errors - エラー型と分類
//!
//! # 分類
//! - `ConfigError`: 起動前の致命的エラー。通知はせず、プロセスを終了する
//! - `RunFailure::Dump`: dump の失敗。失敗通知を送り、dump ツールの終了コードで終了する
//! - `RunFailure::PostDump`: sweep / upload の失敗。失敗通知を送り、`FATAL_EXIT_CODE` で終了する
//! - `NotifyError`: 通知の失敗。ログに出すだけで終了コードには影響しない

use std::path::PathBuf;

use thiserror::Error;

use super::outcome::DumpStatus;

/// 終了コードを持たない致命的エラーすべてに使う終了コード
pub const FATAL_EXIT_CODE: u8 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber {
        key: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("{key} has invalid value {value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("TZ names an unknown timezone: {0:?}")]
    UnknownTimeZone(String),

    #[error("failed to set up {component}")]
    Client {
        component: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read local artifact {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    ObjectStore(#[from] object_store::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to list stored backups")]
    List(#[source] StoreError),

    #[error("failed to delete {} of {attempted} expired backups", .failures.len())]
    Delete {
        attempted: usize,
        failures: Vec<(String, StoreError)>,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed")]
    Http(#[from] reqwest::Error),

    #[error("notification rejected with status {status}: {description}")]
    Rejected { status: u16, description: String },
}

/// dump 成功後に起きた失敗
#[derive(Debug, Error)]
pub enum PostDumpError {
    #[error("retention sweep failed")]
    Sweep(#[from] SweepError),

    #[error("failed to upload backup as {key}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Run を失敗で終わらせた原因
#[derive(Debug, Error)]
pub enum RunFailure {
    #[error("dump failed: {0}")]
    Dump(DumpStatus),

    #[error(transparent)]
    PostDump(#[from] PostDumpError),
}

impl RunFailure {
    /// dump ツールが 1..=255 で終了した場合はその値、それ以外は `FATAL_EXIT_CODE`
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Dump(DumpStatus::Exited(code)) => u8::try_from(*code)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(FATAL_EXIT_CODE),
            _ => FATAL_EXIT_CODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::propagated(DumpStatus::Exited(3), 3)]
    #[case::max(DumpStatus::Exited(255), 255)]
    #[case::out_of_range(DumpStatus::Exited(300), FATAL_EXIT_CODE)]
    #[case::negative(DumpStatus::Exited(-1), FATAL_EXIT_CODE)]
    #[case::aborted(DumpStatus::Aborted("killed".to_string()), FATAL_EXIT_CODE)]
    fn dump_failure_exit_code(#[case] status: DumpStatus, #[case] expected: u8) {
        assert_eq!(RunFailure::Dump(status).exit_code(), expected);
    }

    #[test]
    fn post_dump_failure_uses_fatal_exit_code() {
        let failure = RunFailure::from(PostDumpError::Upload {
            key: "backup-2024-03-01-14-05".to_string(),
            source: StoreError::Other("boom".to_string()),
        });
        assert_eq!(failure.exit_code(), FATAL_EXIT_CODE);
    }

    #[test]
    fn delete_error_reports_counts() {
        let err = SweepError::Delete {
            attempted: 3,
            failures: vec![("backup-a".to_string(), StoreError::Other("denied".to_string()))],
        };
        assert_eq!(err.to_string(), "failed to delete 1 of 3 expired backups");
    }
}
