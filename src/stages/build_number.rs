// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Build number stages
//!
//! `override-build-number` stamps the current run with the commit id;
//! `extract-diary` chains a deployment run's number to the build run that
//! produced the diary.

use clap::Args;
use std::path::PathBuf;

use crate::bridge;
use crate::diary::BuildDiary;
use crate::errors::StagehandResult;

/// Parameters for the override-build-number stage
#[derive(Args, Debug, Clone)]
pub struct OverrideBuildNumberArgs {
    #[clap(long, env = "BUILD_NUMBER")]
    pub build_number: String,

    #[clap(long, env = "COMMIT_ID")]
    pub commit_id: String,
}

/// Execute the override-build-number stage
pub async fn run_override(args: OverrideBuildNumberArgs) -> StagehandResult<()> {
    println!("> Override build number of this pipeline.");
    let new_build_number = format!("{}.{}", args.build_number, args.commit_id);

    println!("{} -> {}", args.build_number, new_build_number);
    bridge::update_build_number(&new_build_number);

    Ok(())
}

/// Parameters for the extract-diary stage
#[derive(Args, Debug, Clone)]
pub struct ExtractDiaryArgs {
    #[clap(long, env = "BUILD_NUMBER")]
    pub build_number: String,

    #[clap(long, env = "PUBLISH_FILE_PATH")]
    pub publish_file_path: PathBuf,
}

/// Execute the extract-diary stage
pub async fn run_extract(args: ExtractDiaryArgs) -> StagehandResult<()> {
    println!("> Validate publish file.");
    let diary = BuildDiary::from_file(&args.publish_file_path)?;

    println!("> Override build number of this pipeline.");
    let new_build_number = format!("{}.{}", args.build_number, diary.build_number);

    println!("{} -> {}", args.build_number, new_build_number);
    bridge::update_build_number(&new_build_number);

    Ok(())
}
