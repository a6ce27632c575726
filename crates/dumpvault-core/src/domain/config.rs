//! Config - 環境変数から組み立てる不変の設定
//!
//! 起動時に一度だけ構築し、以後は変更しません。
//! 必須項目が欠けていれば `ConfigError` で即座に失敗します（Fail-fast）。
//!
//! # テスト容易性
//! - `Config::from_lookup` に lookup 関数を渡せば、プロセス環境を汚さずに検証できる
//! - `Config::from_env` は `std::env::var` を lookup として渡すだけ

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use url::Url;

use super::errors::ConfigError;
use super::strategy::DumpStrategy;

pub const DEFAULT_DUMP_FILE: &str = "backup.dump";

/// pg_dump のデフォルト圧縮レベル
pub const DEFAULT_COMPRESS_LEVEL: u32 = 6;

pub const MAX_COMPRESS_LEVEL: u32 = 9;

pub const DEFAULT_MYSQL_USER: &str = "root";

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Debug に値を出さない文字列
///
/// パスワードや token を含む Config 全体をそのままログに出せるようにするためのもの。
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// dump ツールの呼び出しに関する設定
#[derive(Debug, Clone)]
pub struct DumpConfig {
    pub strategy: DumpStrategy,

    /// 0..=9
    pub compress_level: u32,

    /// dump 実行ファイルの上書き（未指定なら strategy のデフォルト）
    pub binary: Option<String>,

    /// ローカルの dump artifact の置き場所
    pub file: PathBuf,
}

/// S3 互換ストレージの接続情報
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Url,
    pub access_key_id: String,
    pub secret_access_key: Secret,
}

/// Telegram 通知の設定。token と chat id が両方揃ったときだけ存在する。
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Secret,
    pub chat_id: String,
    pub api_url: Url,
    pub timeout: Duration,
}

/// バックアップ 1 回分の実行に必要な全設定
#[derive(Debug, Clone)]
pub struct Config {
    pub dump: DumpConfig,

    /// これより古い backup オブジェクトは retention sweep で削除される
    pub retention: Duration,

    pub store: StoreConfig,

    /// object key と経過時間の計算に使うローカルタイムゾーン
    pub tz: Tz,

    /// None なら通知は no-op
    pub notify: Option<TelegramConfig>,
}

impl Config {
    /// プロセス環境から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の lookup 関数から読み込む
    ///
    /// 空文字列は未設定として扱います。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let dump = dump_config(&env)?;

        let retention_secs: u64 = parse_number("S3_EXPIRE_TIME", env.required("S3_EXPIRE_TIME")?)?;

        let bucket = env.required("S3_BUCKET")?;
        let region = env.required("S3_REGION_NAME")?;
        let endpoint = parse_url("S3_ENDPOINT_URL", env.required("S3_ENDPOINT_URL")?)?;
        let access_key_id = env.required("S3_ACCESS_KEY_ID")?;
        let secret_access_key = Secret::new(env.required("S3_SECRET_ACCESS_KEY")?);

        let tz_name = env.required("TZ")?;
        let tz = Tz::from_str(&tz_name).map_err(|_| ConfigError::UnknownTimeZone(tz_name))?;

        let notify = telegram_config(&env)?;

        Ok(Self {
            dump,
            retention: Duration::from_secs(retention_secs),
            store: StoreConfig {
                bucket,
                region,
                endpoint,
                access_key_id,
                secret_access_key,
            },
            tz,
            notify,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }
}

fn dump_config<F>(env: &Env<F>) -> Result<DumpConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let engine = env
        .optional("DUMP_ENGINE")
        .unwrap_or_else(|| "postgres".to_string());

    let strategy = match engine.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" | "pg" => DumpStrategy::Postgres {
            url: Secret::new(env.required("DATABASE_URL")?),
        },
        "mysql" | "mariadb" => DumpStrategy::MySql {
            host: env.required("DATABASE_HOST")?,
            user: env
                .optional("DATABASE_USER")
                .unwrap_or_else(|| DEFAULT_MYSQL_USER.to_string()),
            password: Secret::new(env.required("DATABASE_ROOT_PWD")?),
            database: env.required("DATABASE_NAME")?,
        },
        _ => {
            return Err(ConfigError::InvalidValue {
                key: "DUMP_ENGINE",
                value: engine,
                reason: "expected one of: postgres, mysql",
            });
        }
    };

    let compress_level = match env.optional("DUMP_COMPRESS") {
        None => DEFAULT_COMPRESS_LEVEL,
        Some(value) => {
            let level: u32 = parse_number("DUMP_COMPRESS", value.clone())?;
            if level > MAX_COMPRESS_LEVEL {
                return Err(ConfigError::InvalidValue {
                    key: "DUMP_COMPRESS",
                    value,
                    reason: "compression level must be between 0 and 9",
                });
            }
            level
        }
    };

    Ok(DumpConfig {
        strategy,
        compress_level,
        binary: env.optional("DUMP_BINARY"),
        file: env
            .optional("DUMP_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP_FILE)),
    })
}

fn telegram_config<F>(env: &Env<F>) -> Result<Option<TelegramConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let bot_token = env.optional("NOTIFY_TELEGRAM_BOT_TOKEN");
    if bot_token.is_none() {
        tracing::debug!("NOTIFY_TELEGRAM_BOT_TOKEN is not set");
    }

    let chat_id = env.optional("NOTIFY_TELEGRAM_BOT_CHAT_ID");
    if chat_id.is_none() {
        tracing::debug!("NOTIFY_TELEGRAM_BOT_CHAT_ID is not set");
    }

    let (Some(bot_token), Some(chat_id)) = (bot_token, chat_id) else {
        return Ok(None);
    };

    let api_url = match env.optional("NOTIFY_TELEGRAM_API_URL") {
        Some(value) => parse_url("NOTIFY_TELEGRAM_API_URL", value)?,
        None => parse_url("NOTIFY_TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL.to_string())?,
    };

    let timeout = match env.optional("NOTIFY_TIMEOUT_SECS") {
        Some(value) => Duration::from_secs(parse_number("NOTIFY_TIMEOUT_SECS", value)?),
        None => DEFAULT_NOTIFY_TIMEOUT,
    };

    Ok(Some(TelegramConfig {
        bot_token: Secret::new(bot_token),
        chat_id,
        api_url,
        timeout,
    }))
}

fn parse_number<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber { key, value, source })
}

fn parse_url(key: &'static str, value: String) -> Result<Url, ConfigError> {
    match Url::parse(&value) {
        Ok(url) if url.has_host() => Ok(url),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected an absolute http(s) URL",
        }),
    }
}
