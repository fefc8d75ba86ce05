// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Error types for stage functions
//!
//! Every stage either fully succeeds or aborts: there are no retries and no
//! partial-failure recovery. Errors carry enough context (command line, exit
//! code, captured streams, attempted paths) for the pipeline log to be the
//! complete diagnostic record.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for stagehand operations
pub type StagehandResult<T> = Result<T, StagehandError>;

/// Main error type for stagehand
#[derive(Error, Debug, Diagnostic)]
pub enum StagehandError {
    // ─────────────────────────────────────────────────────────────────────────
    // Command Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Command failed with exit code {exit_code}: {command}")]
    #[diagnostic(
        code(stagehand::command_failed),
        help("Inspect the captured output above; the stage aborts on the first failing command")
    )]
    CommandFailed {
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Failed to spawn command '{command}': {error}")]
    #[diagnostic(code(stagehand::command_spawn_failed))]
    CommandSpawnFailed {
        command: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    #[error("Tool '{tool}' not found")]
    #[diagnostic(code(stagehand::tool_not_found), help("{suggestion}"))]
    ToolNotFound { tool: String, suggestion: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Diary Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Build diary not found: {path}")]
    #[diagnostic(
        code(stagehand::diary_not_found),
        help("The write-diary stage must run before any stage that consumes the diary")
    )]
    DiaryNotFound { path: PathBuf },

    #[error("No image tag recorded for environment '{environment}'")]
    #[diagnostic(
        code(stagehand::image_tag_not_found),
        help("When is_image_tag_based_on_env is set, the environment must appear in DOCKER_MULTIPLE_TAGS_ENVS at write-diary time")
    )]
    ImageTagNotFound { environment: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Unsupported platform: '{platform}'")]
    #[diagnostic(
        code(stagehand::unsupported_platform),
        help("Supported platforms: MAVEN, DOTNET, NPM, PYTHON")
    )]
    UnsupportedPlatform { platform: String },

    #[error("Platform '{platform}' does not support the '{goal}' goal")]
    #[diagnostic(code(stagehand::unsupported_goal))]
    UnsupportedGoal { platform: String, goal: String },

    #[error("Unsupported pipeline stage: '{stage}'")]
    #[diagnostic(
        code(stagehand::unsupported_stage),
        help("Supported stages: BOOTSTRAP, BUILD, UNIT_TEST, DEPLOYMENT")
    )]
    UnsupportedStage { stage: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Input Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid value for {name}: {reason}")]
    #[diagnostic(code(stagehand::invalid_input))]
    InvalidInput { name: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("File not found: {path}")]
    #[diagnostic(code(stagehand::file_not_found))]
    FileNotFound {
        path: PathBuf,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to copy '{from}' to '{to}': {error}")]
    #[diagnostic(code(stagehand::file_copy_error))]
    FileCopyError {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(stagehand::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(stagehand::io_error))]
    Io { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(stagehand::json_error))]
    Json { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(stagehand::glob_error))]
    GlobPattern { message: String },

    #[error("Could not resolve the home directory")]
    #[diagnostic(
        code(stagehand::home_dir_not_found),
        help("Credential staging writes under $HOME; ensure HOME is set in the agent environment")
    )]
    HomeDirNotFound,
}

impl From<std::io::Error> for StagehandError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_json::Error> for StagehandError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<glob::PatternError> for StagehandError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl StagehandError {
    /// Create a tool not found error with installation suggestion
    pub fn tool_not_found(tool: &str) -> Self {
        let suggestion = match tool {
            "git" => "Install git: https://git-scm.com/downloads".to_string(),
            "docker" => "Install Docker: https://docs.docker.com/engine/install/".to_string(),
            "helm" => "Install Helm: https://helm.sh/docs/intro/install/".to_string(),
            "mvn" => "Install Maven: https://maven.apache.org/install.html".to_string(),
            "dotnet" => "Install .NET SDK: https://dotnet.microsoft.com/download".to_string(),
            "npm" => "Install Node.js/npm: https://nodejs.org/".to_string(),
            "conda" => "Install Conda: https://docs.conda.io/en/latest/miniconda.html".to_string(),
            _ => format!("Install {} and ensure it's in your PATH", tool),
        };

        Self::ToolNotFound {
            tool: tool.to_string(),
            suggestion,
        }
    }

    /// Create an invalid input error for a malformed JSON-encoded variable
    pub fn invalid_json_input(name: &str, e: &serde_json::Error) -> Self {
        Self::InvalidInput {
            name: name.to_string(),
            reason: format!("expected a JSON document: {}", e),
        }
    }
}
