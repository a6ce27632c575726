//! BackupRun - dump → sweep → upload → notify の 1 回分の実行
//!
//! # 設計原則
//! - 各ステップは逐次実行（同時に走るのは dump 出力の転送 task だけ）
//! - dump の失敗と dump 後の失敗を区別し、終了コードに反映する
//! - ローカル artifact はどの経路でも必ず削除する（`LocalArtifact` の Drop）
//! - 削除の失敗はログに出すだけで、Run の結果を上書きしない

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;

use super::notify;
use super::retention::sweep_expired;
use super::upload::upload_artifact;
use crate::domain::{Config, PostDumpError, RunFailure, RunOutcome, RunState};
use crate::ports::{ArtifactStore, Clock, DumpRunner, Notifier};

/// Run ごとに変わらない設定
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub artifact_path: PathBuf,
    pub retention: Duration,
    pub tz: Tz,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            artifact_path: config.dump.file.clone(),
            retention: config.retention,
            tz: config.tz,
        }
    }
}

/// Run の結果
#[derive(Debug)]
pub struct RunReport {
    /// 通過した状態（Start から End まで）
    pub states: Vec<RunState>,
    pub outcome: RunOutcome,
    pub failure: Option<RunFailure>,
    pub notified: bool,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// 通知の成否は終了コードに影響しない
    pub fn exit_code(&self) -> u8 {
        self.failure.as_ref().map_or(0, RunFailure::exit_code)
    }
}

/// ローカルの dump ファイル。Drop で削除される。
pub struct LocalArtifact {
    path: PathBuf,
}

impl LocalArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> std::io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }
}

impl Drop for LocalArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed local artifact"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove local artifact"
            ),
        }
    }
}

/// 状態遷移を記録してログに出す
struct StateTrail {
    states: Vec<RunState>,
}

impl StateTrail {
    fn new() -> Self {
        Self {
            states: vec![RunState::Start],
        }
    }

    fn current(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Start)
    }

    fn enter(&mut self, next: RunState) {
        let from = self.current();
        debug_assert!(
            from.can_transition_to(next),
            "illegal transition {from} -> {next}"
        );
        tracing::info!(from = %from, to = %next, "run state");
        self.states.push(next);
    }
}

pub struct BackupRun {
    settings: RunSettings,
    dumper: Arc<dyn DumpRunner>,
    store: Arc<dyn ArtifactStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl BackupRun {
    pub fn new(
        settings: RunSettings,
        dumper: Arc<dyn DumpRunner>,
        store: Arc<dyn ArtifactStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            dumper,
            store,
            notifier,
            clock,
        }
    }

    fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.settings.tz)
    }

    /// 1 回分を実行する。失敗も含めて常に RunReport を返す。
    pub async fn run(&self) -> RunReport {
        let mut trail = StateTrail::new();
        let started_at = self.now();
        let artifact = LocalArtifact::new(self.settings.artifact_path.clone());

        trail.enter(RunState::Dumping);
        let status = self.dumper.dump(artifact.path()).await;

        let result = if status.is_success() {
            trail.enter(RunState::Dumped);
            self.after_dump(&artifact, &started_at, &mut trail)
                .await
                .map_err(RunFailure::from)
        } else {
            trail.enter(RunState::DumpFailed);
            Err(RunFailure::Dump(status))
        };

        let outcome = match &result {
            Ok(size) => {
                trail.enter(RunState::NotifySuccess);
                RunOutcome::success(started_at, self.now(), *size)
            }
            Err(failure) => {
                tracing::error!(error = %failure, "backup run failed");
                trail.enter(RunState::NotifyFailure);
                RunOutcome::failure(started_at, self.now())
            }
        };
        let notified = notify::deliver(self.notifier.as_ref(), &outcome).await;

        drop(artifact);
        trail.enter(RunState::End);

        RunReport {
            states: trail.states,
            outcome,
            failure: result.err(),
            notified,
        }
    }

    async fn after_dump(
        &self,
        artifact: &LocalArtifact,
        started_at: &DateTime<Tz>,
        trail: &mut StateTrail,
    ) -> Result<u64, PostDumpError> {
        if let Ok(size) = artifact.size() {
            tracing::info!(size, "dump finished");
        }

        trail.enter(RunState::Sweeping);
        if let Err(err) =
            sweep_expired(self.store.as_ref(), self.settings.retention, self.clock.now()).await
        {
            trail.enter(RunState::UploadOrSweepFailed);
            return Err(err.into());
        }

        trail.enter(RunState::Uploading);
        match upload_artifact(self.store.as_ref(), artifact.path(), started_at).await {
            Ok(uploaded) => Ok(uploaded.size),
            Err(err) => {
                trail.enter(RunState::UploadOrSweepFailed);
                Err(err)
            }
        }
    }
}
