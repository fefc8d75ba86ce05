// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Unit-test stage
//!
//! Same dispatch shape as the compile stage, driving each platform's test
//! goal instead.

use clap::Args;
use std::path::PathBuf;
use std::str::FromStr;

use crate::bridge::{self, DEFAULT_VAR_PREFIX};
use crate::cli::parse_flag;
use crate::errors::StagehandResult;
use crate::toolchain::{toolchain_for, Platform, ToolchainContext};

/// Parameters for the unit-test stage
#[derive(Args, Debug, Clone)]
pub struct UnitTestArgs {
    /// Test platform (MAVEN, DOTNET, NPM, PYTHON)
    #[clap(long, env = "PICKED_PLATFORM")]
    pub picked_platform: String,

    #[clap(long, env = "APP_SOURCE_DIR", default_value = "")]
    pub app_source_dir: PathBuf,

    #[clap(long, env = "TARGET_SUB_DIR", default_value = "")]
    pub target_sub_dir: String,

    #[clap(long, env = "TARGET_UNIT_TEST_APP", default_value = "")]
    pub target_unit_test_app: String,

    #[clap(long, env = "TARGET_UNIT_TEST_OUTPUT", default_value = "")]
    pub target_unit_test_output: String,

    /// Overrides the platform's default test goal
    #[clap(long, env = "GOAL_COMMAND")]
    pub goal_command: Option<String>,

    #[clap(long, env = "IS_USE_PRIVATE_LIBS", value_parser = parse_flag, default_value = "false")]
    pub is_use_private_libs: bool,

    #[clap(long, env = "SETTINGS_XML_PATH")]
    pub settings_xml_path: Option<PathBuf>,

    #[clap(long, env = "NUGET_CONFIG_PATH")]
    pub nuget_config_path: Option<PathBuf>,

    #[clap(long, env = "VENV_NAME", default_value = "unit-test")]
    pub venv_name: String,

    #[clap(long, env = "PYTHON_VERSION", default_value = "3.10")]
    pub python_version: String,

    #[clap(long, env = "REQUIREMENTS_TXT_PATH")]
    pub requirements_txt_path: Option<PathBuf>,
}

/// Execute the unit-test stage
pub async fn run(args: UnitTestArgs) -> StagehandResult<()> {
    let platform = Platform::from_str(&args.picked_platform)?;

    let work_dir = args
        .app_source_dir
        .join(&args.target_sub_dir)
        .join(&args.target_unit_test_app);
    let output_dir = args
        .app_source_dir
        .join(&args.target_sub_dir)
        .join(&args.target_unit_test_output);

    bridge::export_batch(
        &[
            (
                "target_unit_test_dir".to_string(),
                work_dir.display().to_string(),
            ),
            (
                "target_unit_test_output_dir".to_string(),
                output_dir.display().to_string(),
            ),
        ],
        DEFAULT_VAR_PREFIX,
    );

    let credential_file = match platform {
        Platform::Maven => args.settings_xml_path.clone(),
        Platform::Dotnet => args.nuget_config_path.clone(),
        Platform::Npm | Platform::Python => None,
    };

    let ctx = ToolchainContext {
        work_dir,
        output_dir,
        goal: args.goal_command,
        use_private_libs: args.is_use_private_libs,
        credential_file,
        env_resource_dir: None,
        venv_name: args.venv_name,
        python_version: args.python_version,
        requirements_path: args.requirements_txt_path,
    };

    println!("> Run unit tests with {}.", platform);
    toolchain_for(platform).unit_test(&ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StagehandError;

    #[tokio::test]
    async fn test_npm_unit_test_is_rejected_not_skipped() {
        let args = UnitTestArgs {
            picked_platform: "NPM".into(),
            app_source_dir: PathBuf::new(),
            target_sub_dir: String::new(),
            target_unit_test_app: String::new(),
            target_unit_test_output: String::new(),
            goal_command: None,
            is_use_private_libs: false,
            settings_xml_path: None,
            nuget_config_path: None,
            venv_name: "unit-test".into(),
            python_version: "3.10".into(),
            requirements_txt_path: None,
        };

        let err = run(args).await.unwrap_err();
        assert!(matches!(err, StagehandError::UnsupportedGoal { .. }));
    }
}
