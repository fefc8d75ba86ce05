// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Compile stage
//!
//! Resolves the build work/output directories, exports them to later steps,
//! and dispatches to the platform toolchain.

use clap::Args;
use std::path::PathBuf;
use std::str::FromStr;

use crate::bridge::{self, DEFAULT_VAR_PREFIX};
use crate::cli::parse_flag;
use crate::errors::StagehandResult;
use crate::toolchain::{toolchain_for, Platform, ToolchainContext};

/// Parameters for the compile stage
#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Build platform (MAVEN, DOTNET, NPM, PYTHON)
    #[clap(long, env = "TARGET_PLATFORM")]
    pub target_platform: String,

    #[clap(long, env = "APP_SOURCE_DIR", default_value = "")]
    pub app_source_dir: PathBuf,

    #[clap(long, env = "TARGET_SUB_DIR", default_value = "")]
    pub target_sub_dir: String,

    #[clap(long, env = "TARGET_BUILD_APP", default_value = "")]
    pub target_build_app: String,

    #[clap(long, env = "TARGET_BUILD_OUTPUT", default_value = "")]
    pub target_build_output: String,

    /// Overrides the platform's default build goal
    #[clap(long, env = "GOAL_COMMAND")]
    pub goal_command: Option<String>,

    #[clap(long, env = "IS_USE_PRIVATE_LIBS", value_parser = parse_flag, default_value = "false")]
    pub is_use_private_libs: bool,

    #[clap(long, env = "SETTINGS_XML_PATH")]
    pub settings_xml_path: Option<PathBuf>,

    #[clap(long, env = "NUGET_CONFIG_PATH")]
    pub nuget_config_path: Option<PathBuf>,

    #[clap(long, env = "ENV_BUILD_RESOURCE_DIR")]
    pub env_build_resource_dir: Option<PathBuf>,
}

/// Execute the compile stage
pub async fn run(args: CompileArgs) -> StagehandResult<()> {
    let platform = Platform::from_str(&args.target_platform)?;

    let work_dir = args
        .app_source_dir
        .join(&args.target_sub_dir)
        .join(&args.target_build_app);
    let output_dir = args
        .app_source_dir
        .join(&args.target_sub_dir)
        .join(&args.target_build_output);

    bridge::export_batch(
        &[
            (
                "target_build_app_dir".to_string(),
                work_dir.display().to_string(),
            ),
            (
                "target_build_output_dir".to_string(),
                output_dir.display().to_string(),
            ),
        ],
        DEFAULT_VAR_PREFIX,
    );

    let credential_file = credential_file_for(platform, &args);
    let ctx = ToolchainContext {
        work_dir,
        output_dir,
        goal: args.goal_command,
        use_private_libs: args.is_use_private_libs,
        credential_file,
        env_resource_dir: args.env_build_resource_dir,
        ..Default::default()
    };

    println!("> Compile with {}.", platform);
    toolchain_for(platform).compile(&ctx).await
}

/// The credential file each platform's native lookup expects
fn credential_file_for(platform: Platform, args: &CompileArgs) -> Option<PathBuf> {
    match platform {
        Platform::Maven => args.settings_xml_path.clone(),
        Platform::Dotnet => args.nuget_config_path.clone(),
        Platform::Npm | Platform::Python => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StagehandError;

    fn base_args() -> CompileArgs {
        CompileArgs {
            target_platform: "MAVEN".into(),
            app_source_dir: PathBuf::from("/src"),
            target_sub_dir: "services".into(),
            target_build_app: "api".into(),
            target_build_output: "target".into(),
            goal_command: None,
            is_use_private_libs: false,
            settings_xml_path: Some(PathBuf::from("/cfg/settings.xml")),
            nuget_config_path: Some(PathBuf::from("/cfg/NuGet.Config")),
            env_build_resource_dir: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_platform_fails_before_any_command() {
        let mut args = base_args();
        args.target_platform = "COBOL".into();

        let err = run(args).await.unwrap_err();
        assert!(matches!(err, StagehandError::UnsupportedPlatform { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_reaches_the_toolchain_with_full_context() {
        let mut args = base_args();
        args.target_platform = "PYTHON".into();
        args.goal_command = Some("pytest".into());

        // Python has no compile goal, so the run ends inside the toolchain
        // after the context (goal, credential file, resources) is assembled.
        let err = run(args).await.unwrap_err();
        assert!(matches!(err, StagehandError::UnsupportedGoal { .. }));
    }

    #[test]
    fn test_credential_file_follows_platform() {
        let args = base_args();
        assert_eq!(
            credential_file_for(Platform::Maven, &args),
            Some(PathBuf::from("/cfg/settings.xml"))
        );
        assert_eq!(
            credential_file_for(Platform::Dotnet, &args),
            Some(PathBuf::from("/cfg/NuGet.Config"))
        );
        assert_eq!(credential_file_for(Platform::Npm, &args), None);
    }
}
