// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! CLI command definitions
//!
//! One subcommand per pipeline stage. Every stage parameter is bound to an
//! environment variable, so agent task definitions configure stages through
//! the environment while local runs can use flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::stages;

/// Pipeline stage toolkit
///
/// Runs the clone, build, test, containerize, and deploy stage functions of
/// an agent-based delivery pipeline.
#[derive(Parser, Debug)]
#[clap(
    name = "stagehand",
    version,
    about = "Stage functions for agent-based delivery pipelines",
    long_about = None,
    after_help = "Examples:\n\
        stagehand setup-stage              Prepare stage directories\n\
        stagehand git-clone                Clone and archive the source\n\
        stagehand compile                  Build for the target platform\n\
        stagehand write-diary              Publish the build diary\n\
        stagehand docker-build             Build and push the image\n\
        stagehand helm-upgrade             Deploy the chart\n\n\
        Parameters come from environment variables; see\n\
        'stagehand <command> --help' for the variable names."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare working directories for a pipeline stage
    SetupStage(stages::workspace::SetupStageArgs),

    /// Clone the source repository and archive it for later stages
    GitClone(stages::clone::GitCloneArgs),

    /// Override the run's build number with `{number}.{commit}`
    OverrideBuildNumber(stages::build_number::OverrideBuildNumberArgs),

    /// Re-derive the build number from a published diary
    ExtractDiary(stages::build_number::ExtractDiaryArgs),

    /// Assemble and persist the build diary
    WriteDiary(stages::write_diary::WriteDiaryArgs),

    /// Compile the application for its target platform
    Compile(stages::compile::CompileArgs),

    /// Run the platform's unit test suite
    UnitTest(stages::unit_test::UnitTestArgs),

    /// Build and push the container image
    DockerBuild(stages::docker::DockerBuildArgs),

    /// Deploy the chart with the diary's image and env vars
    HelmUpgrade(stages::helm::HelmUpgradeArgs),
}

/// Parse a human-written boolean flag value
///
/// Accepts the truthy/falsy spellings agent variable UIs produce
/// (`true`/`1`/`yes`/`y`/`on` and their negatives), case-insensitively.
pub fn parse_flag(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Ok(true),
        "false" | "0" | "no" | "n" | "off" => Ok(false),
        other => Err(format!(
            "'{}' is not a boolean; use true/false, yes/no, 1/0, or on/off",
            other
        )),
    }
}
