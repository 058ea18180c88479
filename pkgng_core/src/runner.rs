/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::runner
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Execute the pkg binary and capture its output for the
    provider layer.

  Security / Safety Notes:
    Arguments are passed directly to exec without a shell;
    no privilege escalation is attempted.

  Dependencies:
    tokio::process for async command execution, async-trait
    so runners can be swapped behind a trait object.

  Operational Scope:
    Single seam between the provider and the operating system.

  Revision History:
    2025-11-12 COD  Extracted pkg process runner.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Reusable helpers for external command diagnostics
============================================================*/

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{PkgngError, Result};

/// Captured result of one pkg invocation.
#[derive(Debug, Clone, Default)]
pub struct PkgOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl PkgOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Return stdout, or a `CommandFailure` when pkg exited non-zero.
    pub fn into_stdout(self, command: String) -> Result<String> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(PkgngError::CommandFailure {
                command,
                status: self.status.unwrap_or(-1),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Something that can run pkg with a list of arguments.
#[async_trait]
pub trait PkgRunner: Send + Sync {
    /// Program name used in diagnostics.
    fn program(&self) -> &str;

    async fn run(&self, args: &[String]) -> Result<PkgOutput>;

    /// Human-readable command line for error messages.
    fn describe(&self, args: &[String]) -> String {
        let mut line = self.program().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Runs the real pkg binary resolved from configuration.
#[derive(Debug, Clone)]
pub struct PkgCommand {
    path: PathBuf,
    display: String,
    timeout: Option<Duration>,
}

impl PkgCommand {
    pub fn new(path: PathBuf, timeout: Option<Duration>) -> Self {
        let display = path.display().to_string();
        Self {
            path,
            display,
            timeout,
        }
    }
}

#[async_trait]
impl PkgRunner for PkgCommand {
    fn program(&self) -> &str {
        &self.display
    }

    async fn run(&self, args: &[String]) -> Result<PkgOutput> {
        let mut command = Command::new(&self.path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let pending = command.output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| PkgngError::Timeout {
                    command: self.describe(args),
                    seconds: limit.as_secs(),
                })?,
            None => pending.await,
        }
        .map_err(|err| map_spawn_error(err, &self.display))?;

        Ok(PkgOutput {
            status: output.status.code(),
            stdout: String::from_utf8(output.stdout).map_err(|err| {
                PkgngError::Serialization(format!(
                    "{} emitted invalid UTF-8: {err}",
                    self.describe(args)
                ))
            })?,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

fn map_spawn_error(err: io::Error, command: &str) -> PkgngError {
    if err.kind() == io::ErrorKind::NotFound {
        PkgngError::CommandMissing {
            command: command.into(),
        }
    } else {
        PkgngError::Runtime(format!("Failed to spawn {command}: {err}"))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_output_becomes_command_failure() {
        let output = PkgOutput {
            status: Some(70),
            stdout: String::new(),
            stderr: "pkg: Insufficient privileges\n".into(),
        };
        match output.into_stdout("pkg install -qy curl".into()) {
            Err(PkgngError::CommandFailure { status, stderr, .. }) => {
                assert_eq!(status, 70);
                assert_eq!(stderr, "pkg: Insufficient privileges");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_maps_to_command_missing() {
        let runner = PkgCommand::new(PathBuf::from("/nonexistent/sbin/pkg"), None);
        let err = runner.run(&["info".to_string()]).await.unwrap_err();
        assert!(matches!(err, PkgngError::CommandMissing { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let runner = PkgCommand::new(PathBuf::from("/bin/sleep"), Some(Duration::from_secs(1)));
        let started = std::time::Instant::now();
        let err = runner.run(&["5".to_string()]).await.unwrap_err();
        match err {
            PkgngError::Timeout { command, seconds } => {
                assert_eq!(command, "/bin/sleep 5");
                assert_eq!(seconds, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn describe_joins_program_and_arguments() {
        let runner = PkgCommand::new(PathBuf::from("/usr/local/sbin/pkg"), None);
        let args = vec!["upgrade".to_string(), "-qy".to_string(), "ftp/curl".to_string()];
        assert_eq!(runner.describe(&args), "/usr/local/sbin/pkg upgrade -qy ftp/curl");
    }
}
