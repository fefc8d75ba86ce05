// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! stagehand - Pipeline Stage Toolkit
//!
//! Runs one pipeline stage function per invocation, configured through
//! environment variables set by the agent task definition.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stagehand::cli::{Cli, Commands};
use stagehand::stages;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                if cli.verbose {
                    "stagehand=debug".into()
                } else {
                    "stagehand=info".into()
                }
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to stage handlers
    match cli.command {
        Commands::SetupStage(args) => stages::workspace::run(args).await?,
        Commands::GitClone(args) => stages::clone::run(args).await?,
        Commands::OverrideBuildNumber(args) => stages::build_number::run_override(args).await?,
        Commands::ExtractDiary(args) => stages::build_number::run_extract(args).await?,
        Commands::WriteDiary(args) => stages::write_diary::run(args).await?,
        Commands::Compile(args) => stages::compile::run(args).await?,
        Commands::UnitTest(args) => stages::unit_test::run(args).await?,
        Commands::DockerBuild(args) => stages::docker::run(args).await?,
        Commands::HelmUpgrade(args) => stages::helm::run(args).await?,
    }

    Ok(())
}
