//! Observability - tracing_subscriber によるログ設定
//!
//! - `RUST_LOG` のディレクティブを優先する
//! - workspace のクレートは `DUMPVAULT_LOG` のレベル（デフォルト debug）で出す
//!   （dump ツールの出力は debug で流れてくるため）
//! - それ以外のクレートは warn

use std::io::IsTerminal;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, filter::LevelFilter};

static LOG_LEVEL_ENV_VAR: &str = "DUMPVAULT_LOG";

const DEFAULT_LOG_LEVEL: &str = "debug";

/// workspace のクレート名
const WORKSPACE_CRATES: &[&str] = &["dumpvault_cli", "dumpvault_core"];

/// ログ出力を初期化する。2 回目以降の呼び出しは何もしない。
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
        let level = std::env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let filter = env_filter(&rust_log, &level);

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .init();

        tracing::debug!(level = %level, "logging initialized");
    });
}

fn env_filter(rust_log: &str, level: &str) -> EnvFilter {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(rust_log);

    for crate_name in WORKSPACE_CRATES {
        // RUST_LOG で個別に指定されていればそちらを使う
        if rust_log.contains(&format!("{crate_name}=")) {
            continue;
        }
        match format!("{crate_name}={level}").parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(err) => eprintln!("ignoring invalid {LOG_LEVEL_ENV_VAR}={level:?}: {err}"),
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_crates_get_the_configured_level() {
        let filter = env_filter("", "info").to_string();
        assert!(filter.contains("dumpvault_core=info"));
        assert!(filter.contains("dumpvault_cli=info"));
    }

    #[test]
    fn rust_log_overrides_per_crate_level() {
        let filter = env_filter("dumpvault_core=trace", "info").to_string();
        assert!(filter.contains("dumpvault_core=trace"));
        assert!(!filter.contains("dumpvault_core=info"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging();
        init_logging();
    }
}
