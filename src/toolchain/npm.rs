// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! npm toolchain
//!
//! Copies the per-environment build resources (.env files and friends) into
//! the work directory, installs, then builds. Unit tests run through the
//! compile pipeline's own tooling on this platform, so `unit_test` is
//! rejected rather than silently skipped.

use async_trait::async_trait;

use super::{unsupported_goal, Platform, Toolchain, ToolchainContext};
use crate::errors::StagehandResult;
use crate::fsops;
use crate::invoker::{require_tool, EchoStream, Invocation};

pub struct NpmToolchain;

const DEFAULT_INSTALL_GOAL: &str = "npm install";
const DEFAULT_BUILD_GOAL: &str = "npm run build";

#[async_trait]
impl Toolchain for NpmToolchain {
    fn platform(&self) -> Platform {
        Platform::Npm
    }

    async fn compile(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        if let Some(ref resources) = ctx.env_resource_dir {
            println!(
                "> Copy environment build resources from {} into {}.",
                resources.display(),
                ctx.work_dir.display()
            );
            fsops::copy_dir_contents(resources, &ctx.work_dir)?;
        }

        require_tool("npm")?;

        // A caller-supplied goal replaces the install step only; the build
        // step always runs afterwards.
        Invocation::new(ctx.goal_or(DEFAULT_INSTALL_GOAL))
            .cwd(&ctx.work_dir)
            .trace()
            .echo(&[EchoStream::Stdout, EchoStream::Stderr])
            .run()
            .await?;

        Invocation::new(DEFAULT_BUILD_GOAL)
            .cwd(&ctx.work_dir)
            .trace()
            .echo(&[EchoStream::Stdout, EchoStream::Stderr])
            .run()
            .await?;

        Ok(())
    }

    async fn unit_test(&self, _ctx: &ToolchainContext) -> StagehandResult<()> {
        Err(unsupported_goal(Platform::Npm, "unit-test"))
    }
}
