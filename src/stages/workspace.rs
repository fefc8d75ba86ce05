// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Workspace setup stage
//!
//! Creates the per-stage section directories and exports their paths to
//! subsequent pipeline steps.

use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{list_dir, PipelineStage};
use crate::bridge::{self, DEFAULT_VAR_PREFIX};
use crate::errors::StagehandResult;

/// Parameters for the setup-stage function
#[derive(Args, Debug, Clone)]
pub struct SetupStageArgs {
    /// Pipeline stage to set up
    #[clap(long, env = "STAGE_NAME")]
    pub stage_name: String,

    #[clap(long, env = "BOOTSTRAP_BASE_DIR", default_value = ".")]
    pub bootstrap_base_dir: PathBuf,

    #[clap(long, env = "BOOTSTRAP_SECTION", default_value = "bootstrap_section")]
    pub bootstrap_section: String,

    #[clap(long, env = "BUILD_BASE_DIR", default_value = ".")]
    pub build_base_dir: PathBuf,

    #[clap(long, env = "BUILD_SECTION", default_value = "build_section")]
    pub build_section: String,

    #[clap(long, env = "BUILD_APP", default_value = "build_app")]
    pub build_app: String,

    #[clap(long, env = "BUILD_DOCKER", default_value = "build_docker")]
    pub build_docker: String,

    #[clap(long, env = "UNIT_TEST_BASE_DIR", default_value = ".")]
    pub unit_test_base_dir: PathBuf,

    #[clap(long, env = "UNIT_TEST_SECTION", default_value = "unit_test_section")]
    pub unit_test_section: String,

    #[clap(long, env = "DEPLOYMENT_BASE_DIR", default_value = ".")]
    pub deployment_base_dir: PathBuf,

    #[clap(long, env = "DEPLOYMENT_SECTION", default_value = "deployment_section")]
    pub deployment_section: String,
}

/// Execute the setup-stage function
pub async fn run(args: SetupStageArgs) -> StagehandResult<()> {
    let stage = PipelineStage::from_str(&args.stage_name)?;

    match stage {
        PipelineStage::Bootstrap => {
            let dir = args.bootstrap_base_dir.join(&args.bootstrap_section);
            create_section_dir(&dir).await?;
            export_dirs(&[("bootstrap_section_dir", &dir)]);
        }
        PipelineStage::Build => {
            let section_dir = args.build_base_dir.join(&args.build_section);
            let app_dir = section_dir.join(&args.build_app);
            let docker_dir = section_dir.join(&args.build_docker);

            println!("Build section path: {}", section_dir.display());
            println!("Build app path: {}", app_dir.display());
            println!("Build docker path: {}", docker_dir.display());

            fs::create_dir_all(&app_dir)?;
            fs::create_dir_all(&docker_dir)?;
            create_section_dir(&section_dir).await?;

            export_dirs(&[
                ("build_base_dir", &args.build_base_dir),
                ("build_section_dir", &section_dir),
                ("build_app_dir", &app_dir),
                ("build_docker_dir", &docker_dir),
            ]);
        }
        PipelineStage::UnitTest => {
            let dir = args.unit_test_base_dir.join(&args.unit_test_section);
            create_section_dir(&dir).await?;
            export_dirs(&[("unit_test_section_dir", &dir)]);
        }
        PipelineStage::Deployment => {
            let dir = args.deployment_base_dir.join(&args.deployment_section);
            create_section_dir(&dir).await?;
            export_dirs(&[("deployment_section_dir", &dir)]);
        }
    }

    Ok(())
}

async fn create_section_dir(dir: &Path) -> StagehandResult<()> {
    println!("> Create section directory at: {}.", dir.display());
    fs::create_dir_all(dir)?;
    list_dir(dir).await
}

fn export_dirs(pairs: &[(&str, &PathBuf)]) {
    println!("> Expose paths into pipeline envs.");
    let pairs: Vec<(String, String)> = pairs
        .iter()
        .map(|(name, path)| (name.to_string(), path.display().to_string()))
        .collect();
    bridge::export_batch(&pairs, DEFAULT_VAR_PREFIX);
}
