// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Command invoker
//!
//! Turns a fully substituted command line into a process invocation, captures
//! both output streams, and classifies the outcome. A command containing a
//! pipe character runs through `sh -c` so pipelines and redirection work;
//! everything else is tokenized and executed as an argument vector, keeping
//! interpolated values out of shell interpretation.
//!
//! The invoker does no escaping on the shell path: callers own the handful
//! of pipe-using templates (docker/helm `--password-stdin` logins) and must
//! not feed them unvalidated input.

pub mod tokenizer;

use colored::Colorize;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{StagehandError, StagehandResult};

/// Which captured streams to echo into the pipeline log after a
/// successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoStream {
    Stdout,
    Stderr,
}

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Process exit code
    pub exit_code: i32,
}

/// A single external command invocation
///
/// Builder over the command string plus working directory, extra environment
/// variables, and logging behavior.
#[derive(Debug, Clone)]
pub struct Invocation {
    command: String,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
    trace: bool,
    echo: Vec<EchoStream>,
}

impl Invocation {
    /// Create an invocation for a command line
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            env: Vec::new(),
            trace: false,
            echo: vec![EchoStream::Stdout],
        }
    }

    /// Set the working directory
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Add an environment variable for this invocation only
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Print the command line before executing
    pub fn trace(mut self) -> Self {
        self.trace = true;
        self
    }

    /// Select which captured streams are echoed on success
    pub fn echo(mut self, streams: &[EchoStream]) -> Self {
        self.echo = streams.to_vec();
        self
    }

    /// Echo nothing on success
    pub fn silent(mut self) -> Self {
        self.echo.clear();
        self
    }

    /// Execute the command and classify the outcome
    ///
    /// Non-zero exit prints the full diagnostic context to the pipeline log
    /// and returns [`StagehandError::CommandFailed`]; callers never retry.
    pub async fn run(self) -> StagehandResult<CommandOutput> {
        let command = self.command.trim().to_string();
        if command.is_empty() {
            return Err(StagehandError::InvalidInput {
                name: "command".to_string(),
                reason: "empty command line".to_string(),
            });
        }

        if self.trace {
            println!("{}", command.dimmed());
        }
        debug!(command = %command, "executing");

        let mut cmd = if uses_shell(&command) {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&command);
            c
        } else {
            let tokens = tokenizer::split(&command)?;
            let (program, args) = tokens.split_first().ok_or_else(|| {
                StagehandError::InvalidInput {
                    name: "command".to_string(),
                    reason: "empty command line".to_string(),
                }
            })?;
            let mut c = Command::new(program);
            c.args(args);
            c
        };

        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let output = cmd.output().await.map_err(|e| StagehandError::CommandSpawnFailed {
            command: command.clone(),
            error: e.to_string(),
            help: Some("Check that the tool is installed and on PATH".into()),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if output.status.success() {
            for stream in &self.echo {
                match stream {
                    EchoStream::Stdout if !stdout.is_empty() => println!("{}", stdout),
                    EchoStream::Stderr if !stderr.is_empty() => eprintln!("{}", stderr),
                    _ => {}
                }
            }

            return Ok(CommandOutput {
                stdout,
                stderr,
                exit_code,
            });
        }

        // Surface the full context in the pipeline log before raising.
        eprintln!("{}", "Command failed:".red().bold());
        eprintln!("  Command: {}", command);
        eprintln!("  Exit code: {}", exit_code);
        if !stdout.is_empty() {
            eprintln!("  Output: {}", stdout.trim_end());
        }
        if !stderr.is_empty() {
            eprintln!("  Error: {}", stderr.trim_end());
        }

        Err(StagehandError::CommandFailed {
            command,
            exit_code,
            stdout,
            stderr,
        })
    }
}

/// A command line with a pipe must go through a shell interpreter
pub fn uses_shell(command: &str) -> bool {
    command.contains('|')
}

/// Resolve a tool binary on PATH, failing with an installation hint
pub fn require_tool(tool: &str) -> StagehandResult<PathBuf> {
    which::which(tool).map_err(|_| StagehandError::tool_not_found(tool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_selects_shell_path() {
        assert!(uses_shell("echo secret | docker login --password-stdin"));
        assert!(!uses_shell("git rev-parse HEAD"));
    }

    #[tokio::test]
    async fn test_run_tokenized_command() {
        let out = Invocation::new("echo hello world")
            .silent()
            .run()
            .await
            .unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout.trim(), "hello world");
    }

    #[tokio::test]
    async fn test_run_pipeline_through_shell() {
        let out = Invocation::new("printf 'a\\nb\\nc' | wc -l")
            .silent()
            .run()
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "2");
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_both_streams() {
        let err = Invocation::new(r#"sh -c "echo out; echo err 1>&2; exit 3""#)
            .silent()
            .run()
            .await
            .unwrap_err();

        match err {
            StagehandError::CommandFailed {
                exit_code,
                stdout,
                stderr,
                ..
            } => {
                assert_eq!(exit_code, 3);
                assert_eq!(stdout.trim(), "out");
                assert_eq!(stderr.trim(), "err");
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_command_is_invalid() {
        let err = Invocation::new("   ").run().await.unwrap_err();
        assert!(matches!(err, StagehandError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_cwd_and_env_apply() {
        let dir = tempfile::tempdir().unwrap();
        let out = Invocation::new("sh -c 'echo $STAGEHAND_PROBE; pwd'")
            .cwd(dir.path())
            .env("STAGEHAND_PROBE", "42")
            .silent()
            .run()
            .await
            .unwrap();

        let mut lines = out.stdout.lines();
        assert_eq!(lines.next().unwrap(), "42");
        assert!(lines.next().unwrap().contains(
            dir.path().file_name().unwrap().to_str().unwrap()
        ));
    }
}
