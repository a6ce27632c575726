use std::process::ExitCode;
use std::sync::Arc;

use dumpvault_core::app::{BackupRun, RunSettings};
use dumpvault_core::domain::{Config, ConfigError, FATAL_EXIT_CODE};
use dumpvault_core::impls::{ObjectArtifactStore, ProcessDumpRunner, notifier_from_config};
use dumpvault_core::observability;
use dumpvault_core::ports::SystemClock;

/// 1 回だけバックアップを実行して終了する（実行間隔は cron などの外側で決める）
///
/// 終了コード:
/// - 0: 成功（通知に失敗しても 0）
/// - dump ツールの終了コード: dump が 1..=255 で失敗した
/// - 1: 設定エラー / dump を起動できなかった / dump 後の失敗
#[tokio::main]
async fn main() -> ExitCode {
    observability::init_logging();

    let run = match wire(|key| std::env::var(key).ok()) {
        Ok(run) => run,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return ExitCode::from(FATAL_EXIT_CODE);
        }
    };

    let report = run.run().await;
    if report.is_success() {
        tracing::info!("backup finished");
    }
    ExitCode::from(report.exit_code())
}

/// 設定を読み、ports に実装を差し込む
///
/// 設定エラーのときは adapter を 1 つも作らずに返す。
fn wire<F>(lookup: F) -> Result<BackupRun, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::from_lookup(lookup)?;
    tracing::info!(?config, "configuration loaded");

    let store = ObjectArtifactStore::s3(&config.store).map_err(|err| ConfigError::Client {
        component: "object store client",
        source: Box::new(err),
    })?;
    let notifier = notifier_from_config(config.notify.as_ref()).map_err(|err| ConfigError::Client {
        component: "notification client",
        source: Box::new(err),
    })?;

    Ok(BackupRun::new(
        RunSettings::from_config(&config),
        Arc::new(ProcessDumpRunner::new(config.dump.clone())),
        Arc::new(store),
        notifier,
        Arc::new(SystemClock),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn env(dump_file: &Path) -> HashMap<&'static str, String> {
        HashMap::from([
            ("DATABASE_URL", "postgres://root:pw@db:5432/app".to_string()),
            ("DUMP_FILE", dump_file.to_string_lossy().into_owned()),
            ("S3_EXPIRE_TIME", "604800".to_string()),
            ("S3_BUCKET", "backups".to_string()),
            ("S3_REGION_NAME", "ru-central1".to_string()),
            ("S3_ENDPOINT_URL", "http://127.0.0.1:9000".to_string()),
            ("S3_ACCESS_KEY_ID", "AKIA".to_string()),
            ("S3_SECRET_ACCESS_KEY", "s3cr3t".to_string()),
            ("TZ", "Europe/Moscow".to_string()),
        ])
    }

    fn wire_from(env: &HashMap<&'static str, String>) -> Result<BackupRun, ConfigError> {
        wire(|key| env.get(key).cloned())
    }

    #[test]
    fn complete_environment_wires_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let dump_file = dir.path().join("backup.dump");

        assert!(wire_from(&env(&dump_file)).is_ok());
        assert!(!dump_file.exists());
    }

    #[test]
    fn empty_environment_is_rejected() {
        assert!(matches!(
            wire(|_| None),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn config_error_stops_before_anything_runs() {
        let dir = tempfile::tempdir().unwrap();
        let dump_file = dir.path().join("backup.dump");
        let mut env = env(&dump_file);
        env.insert("TZ", "Mars/Olympus_Mons".to_string());

        let err = match wire_from(&env) {
            Ok(_) => panic!("unknown timezone must be rejected"),
            Err(err) => err,
        };

        assert!(matches!(err, ConfigError::UnknownTimeZone(ref name) if name == "Mars/Olympus_Mons"));
        assert!(!dump_file.exists());
    }
}
