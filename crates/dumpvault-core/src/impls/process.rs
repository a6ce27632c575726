//! ProcessDumpRunner - dump ツールを子プロセスとして実行する

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::log_forward::LogForwarder;
use crate::domain::{DumpCommand, DumpConfig, DumpStatus};
use crate::ports::DumpRunner;

/// 設定された DumpStrategy でコマンドを組み立てて実行する
pub struct ProcessDumpRunner {
    config: DumpConfig,
}

impl ProcessDumpRunner {
    pub fn new(config: DumpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DumpRunner for ProcessDumpRunner {
    async fn dump(&self, dest: &Path) -> DumpStatus {
        let command = self.config.strategy.command(
            self.config.binary.as_deref(),
            self.config.compress_level,
            dest,
        );
        tracing::info!(
            engine = self.config.strategy.engine(),
            program = command.program(),
            dest = %dest.display(),
            "starting dump"
        );
        run_command(&command).await
    }
}

/// コマンドを実行し、stdout / stderr を行単位で debug ログに流す
///
/// 親は pipe の書き込み側を持たないので、子が終了すれば forwarder は EOF に達する。
pub async fn run_command(command: &DumpCommand) -> DumpStatus {
    let mut child = match Command::new(command.program())
        .args(command.args().iter().map(|arg| arg.as_os_str()))
        .envs(command.envs().iter().map(|(key, value)| (key, value.expose())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            return DumpStatus::Aborted(format!("failed to start {}: {err}", command.program()));
        }
    };

    let mut forwarder = LogForwarder::new();
    if let Some(stdout) = child.stdout.take() {
        forwarder.forward("stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        forwarder.forward("stderr", stderr);
    }

    let waited = child.wait().await;
    let lines = forwarder.join().await;

    let status = match waited {
        Ok(status) if status.success() => DumpStatus::Succeeded,
        Ok(status) => match status.code() {
            Some(code) => DumpStatus::Exited(code),
            None => DumpStatus::Aborted(format!("terminated by signal ({status})")),
        },
        Err(err) => DumpStatus::Aborted(format!("failed to wait for {}: {err}", command.program())),
    };

    tracing::debug!(program = command.program(), lines, %status, "dump process finished");
    status
}
