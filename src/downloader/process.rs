// Subprocess execution behind a trait, so the download flow can run against a
// scripted stand-in instead of real binaries

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

/// Captured result of one finished child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running {}: {message}", .program.display())]
    Io { program: PathBuf, message: String },

    #[error("Timed out after {secs}s")]
    TimedOut { secs: u64 },
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion and capture its output
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, ProcessError>;
}

/// Spawns real child processes on the tokio runtime
#[derive(Debug, Clone, Default)]
pub struct TokioRunner {
    timeout_secs: Option<u64>,
}

impl TokioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child if it runs longer than `secs`. No limit by default.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[async_trait]
impl CommandRunner for TokioRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, ProcessError> {
        let io_err = |message: String| ProcessError::Io {
            program: program.to_path_buf(),
            message,
        };

        let mut child = TokioCommand::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        let mut stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| io_err("failed to capture stdout".to_string()))?;
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| io_err("failed to capture stderr".to_string()))?;

        // Drain both pipes concurrently so a chatty child never blocks on a full pipe
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
        });

        let status = match self.timeout_secs {
            Some(secs) => match timeout(Duration::from_secs(secs), child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    let _ = child.kill().await;
                    stdout_task.abort();
                    stderr_task.abort();
                    return Err(ProcessError::TimedOut { secs });
                }
            },
            None => child.wait().await,
        }
        .map_err(|e| io_err(format!("wait failed: {}", e)))?;

        let stdout = stdout_task
            .await
            .map_err(|e| io_err(format!("stdout task failed: {}", e)))?
            .map_err(|e| io_err(format!("failed to read stdout: {}", e)))?;
        let stderr = stderr_task
            .await
            .map_err(|e| io_err(format!("stderr task failed: {}", e)))?
            .map_err(|e| io_err(format!("failed to read stderr: {}", e)))?;

        Ok(ProcessOutput {
            success: status.success(),
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let out = TokioRunner::new()
            .run(Path::new("/bin/sh"), &sh("echo hello; echo oops >&2"))
            .await
            .unwrap();

        assert!(out.success);
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn reports_non_zero_exit() {
        let out = TokioRunner::new()
            .run(Path::new("/bin/sh"), &sh("exit 3"))
            .await
            .unwrap();

        assert!(!out.success);
        assert_eq!(out.code, Some(3));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = TokioRunner::new()
            .run(Path::new("/definitely/not/here"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessError::Spawn { .. }));
    }

    #[tokio::test]
    async fn timeout_kills_the_child() {
        let err = TokioRunner::new()
            .with_timeout(Some(1))
            .run(Path::new("/bin/sh"), &sh("sleep 5"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessError::TimedOut { secs: 1 }));
    }
}
