//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（dump ツール, S3 互換ストレージ, 通知 API, 時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod artifact_store;
pub mod clock;
pub mod dump_runner;
pub mod notifier;

// 主要な trait を再エクスポート
pub use self::artifact_store::{ArtifactStore, StoredObject};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::dump_runner::DumpRunner;
pub use self::notifier::Notifier;
