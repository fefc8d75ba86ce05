// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Maven toolchain
//!
//! Stages `settings.xml` into `~/.m2` for private-repository resolution,
//! then runs the compile or test goal in the application work directory.

use async_trait::async_trait;

use super::{stage_credential_file, Platform, Toolchain, ToolchainContext};
use crate::errors::{StagehandError, StagehandResult};
use crate::invoker::{require_tool, EchoStream, Invocation};

pub struct MavenToolchain;

const DEFAULT_COMPILE_GOAL: &str = "mvn clean package";
const DEFAULT_TEST_GOAL: &str = "mvn test";

impl MavenToolchain {
    fn prepare(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        if !ctx.use_private_libs {
            return Ok(());
        }

        println!("> Fetching libs from private repository.");
        let credential_file =
            ctx.credential_file
                .as_deref()
                .ok_or_else(|| StagehandError::InvalidInput {
                    name: "SETTINGS_XML_PATH".to_string(),
                    reason: "required when IS_USE_PRIVATE_LIBS is set".to_string(),
                })?;

        stage_credential_file(credential_file, &[".m2", "settings.xml"])?;
        Ok(())
    }

    async fn run_goal(&self, ctx: &ToolchainContext, default: &str) -> StagehandResult<()> {
        self.prepare(ctx)?;
        require_tool("mvn")?;

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
impl Toolchain for MavenToolchain {
    fn platform(&self) -> Platform {
        Platform::Maven
    }

    async fn compile(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        self.run_goal(ctx, DEFAULT_COMPILE_GOAL).await
    }

    async fn unit_test(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        self.run_goal(ctx, DEFAULT_TEST_GOAL).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_libs_require_settings_path() {
        let toolchain = MavenToolchain;
        let ctx = ToolchainContext {
            use_private_libs: true,
            ..Default::default()
        };

        let err = toolchain.prepare(&ctx).unwrap_err();
        assert!(matches!(err, StagehandError::InvalidInput { .. }));
    }

    #[test]
    fn test_public_libs_skip_staging() {
        let toolchain = MavenToolchain;
        assert!(toolchain.prepare(&ToolchainContext::default()).is_ok());
    }
}
