//! Domain model (config, dump strategy, outcome, run state, errors, formatting).
//!
//! 外部システムには触れない純粋な型と関数だけを置く。

pub mod config;
pub mod errors;
pub mod format;
pub mod key;
pub mod outcome;
pub mod state;
pub mod strategy;

pub use self::config::{Config, DumpConfig, Secret, StoreConfig, TelegramConfig};
pub use self::errors::{
    ConfigError, FATAL_EXIT_CODE, NotifyError, PostDumpError, RunFailure, StoreError, SweepError,
};
pub use self::format::{format_elapsed, format_size};
pub use self::key::{BACKUP_KEY_PREFIX, is_backup_key, object_key};
pub use self::outcome::{DumpStatus, RunOutcome};
pub use self::state::RunState;
pub use self::strategy::{CommandArg, DumpCommand, DumpStrategy};
