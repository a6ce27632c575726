//! State - バックアップ Run の状態
//!
//! # 状態遷移
//! ```text
//! Start -> Dumping -> DumpFailed -> NotifyFailure -> End
//!                  -> Dumped -> Sweeping -> Uploading -> NotifySuccess -> End
//!                               (Sweeping | Uploading) -> UploadOrSweepFailed -> NotifyFailure -> End
//! ```
//! どの経路でも End の直前にローカル artifact を削除する。

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Dumping,
    DumpFailed,
    Dumped,
    Sweeping,
    Uploading,
    UploadOrSweepFailed,
    NotifySuccess,
    NotifyFailure,
    End,
}

impl RunState {
    /// この状態から遷移できる状態か
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Start, Dumping)
                | (Dumping, DumpFailed)
                | (Dumping, Dumped)
                | (DumpFailed, NotifyFailure)
                | (Dumped, Sweeping)
                | (Sweeping, Uploading)
                | (Sweeping, UploadOrSweepFailed)
                | (Uploading, UploadOrSweepFailed)
                | (Uploading, NotifySuccess)
                | (UploadOrSweepFailed, NotifyFailure)
                | (NotifySuccess, End)
                | (NotifyFailure, End)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
