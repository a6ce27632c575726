//! dumpvault-core
//!
//! データベースの定期バックアップを 1 回分実行するための部品。
//!
//! # モジュール構成
//! - **domain**: 設定, dump strategy, Run の結果と状態, エラー, 表示用フォーマット
//! - **ports**: 抽象化レイヤー（Clock, ArtifactStore, DumpRunner, Notifier）
//! - **impls**: 実装（S3 互換ストレージ, InMemory, 子プロセス, Telegram）
//! - **app**: アプリケーションロジック（BackupRun, retention sweep, upload, notify）
//! - **observability**: ログ設定

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
