// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! .NET toolchain
//!
//! Stages `NuGet.Config` into `~/.nuget/NuGet` for private-feed resolution.
//! The default test goal emits a junit log so the pipeline's test-report
//! step can pick it up.

use async_trait::async_trait;

use super::{stage_credential_file, Platform, Toolchain, ToolchainContext};
use crate::errors::{StagehandError, StagehandResult};
use crate::invoker::{require_tool, EchoStream, Invocation};

pub struct DotnetToolchain;

const DEFAULT_TEST_GOAL: &str = r#"dotnet test --logger "junit;LogFileName=TestResults.xml""#;

impl DotnetToolchain {
    fn prepare(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        if !ctx.use_private_libs {
            return Ok(());
        }

        println!("> Fetching libs from private repository.");
        let credential_file =
            ctx.credential_file
                .as_deref()
                .ok_or_else(|| StagehandError::InvalidInput {
                    name: "NUGET_CONFIG_PATH".to_string(),
                    reason: "required when IS_USE_PRIVATE_LIBS is set".to_string(),
                })?;

        stage_credential_file(credential_file, &[".nuget", "NuGet", "NuGet.Config"])?;
        Ok(())
    }

    async fn run_goal(&self, ctx: &ToolchainContext, default: String) -> StagehandResult<()> {
        self.prepare(ctx)?;
        require_tool("dotnet")?;

        Invocation::new(ctx.goal_or(default))
            .cwd(&ctx.work_dir)
            .trace()
            .echo(&[EchoStream::Stdout, EchoStream::Stderr])
            .run()
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Toolchain for DotnetToolchain {
    fn platform(&self) -> Platform {
        Platform::Dotnet
    }

    async fn compile(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        let default = format!("dotnet publish -o {}", ctx.output_dir.display());
        self.run_goal(ctx, default).await
    }

    async fn unit_test(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        self.run_goal(ctx, DEFAULT_TEST_GOAL.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_private_libs_require_nuget_config() {
        let ctx = ToolchainContext {
            use_private_libs: true,
            ..Default::default()
        };

        let err = DotnetToolchain.prepare(&ctx).unwrap_err();
        assert!(matches!(err, StagehandError::InvalidInput { .. }));
    }

    #[test]
    fn test_default_compile_goal_targets_output_dir() {
        let ctx = ToolchainContext {
            output_dir: PathBuf::from("/work/out"),
            ..Default::default()
        };
        assert_eq!(
            ctx.goal_or(format!("dotnet publish -o {}", ctx.output_dir.display())),
            "dotnet publish -o /work/out"
        );
    }
}
