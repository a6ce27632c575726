//! DumpStrategy - どの dump ツールをどう呼ぶか
//!
//! Strategy はコマンドラインを「組み立てる」だけで、実行はしません。
//! 実行は `ports::DumpRunner` の責務です。

use std::ffi::{OsStr, OsString};
use std::path::Path;

use super::config::Secret;

/// データベースエンジンごとの dump 方法
#[derive(Debug, Clone)]
pub enum DumpStrategy {
    /// `pg_dump` (custom format)
    Postgres { url: Secret },

    /// `mysqldump`。パスワードは argv ではなく `MYSQL_PWD` で渡す
    MySql {
        host: String,
        user: String,
        password: Secret,
        database: String,
    },
}

impl DumpStrategy {
    pub fn engine(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::MySql { .. } => "mysql",
        }
    }

    pub fn default_binary(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "pg_dump",
            Self::MySql { .. } => "mysqldump",
        }
    }

    /// dump コマンドを組み立てる
    ///
    /// `binary` が None なら [`DumpStrategy::default_binary`] を使う。
    pub fn command(&self, binary: Option<&str>, compress_level: u32, dest: &Path) -> DumpCommand {
        let program = binary.unwrap_or_else(|| self.default_binary());

        match self {
            Self::Postgres { url } => DumpCommand::new(program)
                .arg("--verbose")
                .arg("--format=custom")
                .arg(format!("--compress={compress_level}"))
                .arg(prefixed("--file=", dest))
                .sensitive_arg(url.clone()),
            Self::MySql {
                host,
                user,
                password,
                database,
            } => {
                tracing::debug!(
                    compress_level,
                    "mysqldump has no archive compression; ignoring compression level"
                );
                DumpCommand::new(program)
                    .arg("--verbose")
                    .arg(format!("--host={host}"))
                    .arg(format!("--user={user}"))
                    .arg("--single-transaction")
                    .arg(prefixed("--result-file=", dest))
                    .arg(database)
                    .env("MYSQL_PWD", password.clone())
            }
        }
    }
}

fn prefixed(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path);
    arg
}

/// コマンドライン引数。Sensitive は Debug で伏せられる。
#[derive(Debug, Clone)]
pub enum CommandArg {
    Plain(OsString),
    Sensitive(Secret),
}

impl CommandArg {
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            Self::Plain(arg) => arg.as_os_str(),
            Self::Sensitive(secret) => OsStr::new(secret.expose()),
        }
    }
}

/// 外部プロセスとして起動するコマンド
#[derive(Debug, Clone)]
pub struct DumpCommand {
    program: String,
    args: Vec<CommandArg>,
    envs: Vec<(String, Secret)>,
}

impl DumpCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(CommandArg::Plain(arg.into()));
        self
    }

    pub fn sensitive_arg(mut self, arg: Secret) -> Self {
        self.args.push(CommandArg::Sensitive(arg));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: Secret) -> Self {
        self.envs.push((key.into(), value));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[CommandArg] {
        &self.args
    }

    pub fn envs(&self) -> &[(String, Secret)] {
        &self.envs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_args(command: &DumpCommand) -> Vec<String> {
        command
            .args()
            .iter()
            .map(|arg| arg.as_os_str().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn postgres_command_matches_pg_dump_flags() {
        let strategy = DumpStrategy::Postgres {
            url: Secret::new("postgres://u:p@db/app"),
        };

        let command = strategy.command(None, 6, Path::new("/tmp/backup.dump"));

        assert_eq!(command.program(), "pg_dump");
        assert_eq!(
            rendered_args(&command),
            vec![
                "--verbose",
                "--format=custom",
                "--compress=6",
                "--file=/tmp/backup.dump",
                "postgres://u:p@db/app",
            ]
        );
        assert!(command.envs().is_empty());
    }

    #[test]
    fn mysql_password_goes_through_env_not_argv() {
        let strategy = DumpStrategy::MySql {
            host: "mysql".to_string(),
            user: "root".to_string(),
            password: Secret::new("hunter2"),
            database: "shop".to_string(),
        };

        let command = strategy.command(Some("/usr/local/bin/mysqldump"), 0, Path::new("out.sql"));

        assert_eq!(command.program(), "/usr/local/bin/mysqldump");
        let args = rendered_args(&command);
        assert!(args.iter().all(|arg| !arg.contains("hunter2")));
        assert!(args.contains(&"--result-file=out.sql".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("shop"));
        assert_eq!(command.envs()[0].0, "MYSQL_PWD");
        assert_eq!(command.envs()[0].1.expose(), "hunter2");
    }

    #[test]
    fn debug_hides_connection_string() {
        let strategy = DumpStrategy::Postgres {
            url: Secret::new("postgres://u:p@db/app"),
        };
        let command = strategy.command(None, 0, Path::new("backup.dump"));

        assert!(!format!("{command:?}").contains("u:p@db"));
    }
}
