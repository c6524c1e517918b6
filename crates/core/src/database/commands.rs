//! `pg_ctl` invocations used to bootstrap a local PostgreSQL server.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::errors::LifecycleError;

/// Name of the server log written next to the data directory contents.
pub const SERVER_LOG_FILE: &str = "postgresql.log";

/// Control surface over the database server process.
///
/// Each call returns the combined command output on success.
#[async_trait]
pub trait ServerControl: Send + Sync {
    async fn init_db(&self, data_dir: &Path) -> Result<String, LifecycleError>;

    async fn start(&self, data_dir: &Path, startup_params: &str) -> Result<String, LifecycleError>;

    async fn status(&self, data_dir: &Path) -> Result<String, LifecycleError>;
}

/// Runs `<binary_path>/pg_ctl`.
pub struct PgCtl {
    program: PathBuf,
}

impl PgCtl {
    /// An empty `binary_path` resolves `pg_ctl` through `PATH`.
    pub fn new(binary_path: &str) -> Self {
        let program = if binary_path.trim().is_empty() {
            PathBuf::from("pg_ctl")
        } else {
            Path::new(binary_path).join("pg_ctl")
        };
        Self { program }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn init_args(data_dir: &Path) -> Vec<OsString> {
        vec!["initdb".into(), "-D".into(), data_dir.into()]
    }

    fn start_args(data_dir: &Path, startup_params: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["start".into(), "-D".into(), data_dir.into()];
        args.push("-l".into());
        args.push(data_dir.join(SERVER_LOG_FILE).into());
        if !startup_params.trim().is_empty() {
            args.push("-o".into());
            args.push(startup_params.trim().into());
        }
        args
    }

    fn status_args(data_dir: &Path) -> Vec<OsString> {
        vec!["status".into(), "-D".into(), data_dir.into()]
    }

    fn describe(&self, args: &[OsString]) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    async fn run(&self, args: Vec<OsString>) -> Result<String, LifecycleError> {
        let command = self.describe(&args);
        log::debug!("Running `{}`", command);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| LifecycleError::Command {
                command: command.clone(),
                message: e.to_string(),
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(text)
        } else {
            Err(LifecycleError::Command {
                command,
                message: format!("{} - {}", output.status, text.trim()),
            })
        }
    }
}

#[async_trait]
impl ServerControl for PgCtl {
    async fn init_db(&self, data_dir: &Path) -> Result<String, LifecycleError> {
        self.run(Self::init_args(data_dir)).await
    }

    async fn start(&self, data_dir: &Path, startup_params: &str) -> Result<String, LifecycleError> {
        self.run(Self::start_args(data_dir, startup_params)).await
    }

    async fn status(&self, data_dir: &Path) -> Result<String, LifecycleError> {
        self.run(Self::status_args(data_dir)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_program_path() {
        assert_eq!(
            PgCtl::new("/usr/lib/postgresql/16/bin").program(),
            Path::new("/usr/lib/postgresql/16/bin/pg_ctl")
        );
        assert_eq!(PgCtl::new("").program(), Path::new("pg_ctl"));
    }

    #[test]
    fn test_start_args_forward_params_and_log() {
        let args = strings(PgCtl::start_args(Path::new("/data/pg"), "-p 5433"));
        assert_eq!(
            args,
            vec![
                "start",
                "-D",
                "/data/pg",
                "-l",
                "/data/pg/postgresql.log",
                "-o",
                "-p 5433"
            ]
        );
    }

    #[test]
    fn test_start_args_without_params() {
        let args = strings(PgCtl::start_args(Path::new("/data/pg"), "  "));
        assert!(!args.contains(&"-o".to_string()));
    }

    #[test]
    fn test_init_and_status_args() {
        assert_eq!(
            strings(PgCtl::init_args(Path::new("/data/pg"))),
            vec!["initdb", "-D", "/data/pg"]
        );
        assert_eq!(
            strings(PgCtl::status_args(Path::new("/data/pg"))),
            vec!["status", "-D", "/data/pg"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_command_error() {
        let ctl = PgCtl::new("/nonexistent/tickerwatch/bin");
        let err = ctl.status(Path::new("/tmp")).await.unwrap_err();
        match err {
            LifecycleError::Command { command, .. } => {
                assert!(command.starts_with("/nonexistent/tickerwatch/bin/pg_ctl status"));
            }
            other => panic!("expected command error, got {:?}", other),
        }
    }
}
