// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Python toolchain
//!
//! Unit tests run inside a conda environment: create it if missing, install
//! the pinned requirements, then run the discovery goal through `conda run`.
//! There is no compile step for this platform.

use async_trait::async_trait;

use super::{unsupported_goal, Platform, Toolchain, ToolchainContext};
use crate::errors::{StagehandError, StagehandResult};
use crate::invoker::{require_tool, EchoStream, Invocation};

pub struct PythonToolchain;

impl PythonToolchain {
    async fn venv_exists(&self, venv_name: &str) -> StagehandResult<bool> {
        let output = Invocation::new("conda env list").silent().run().await?;
        Ok(output.stdout.lines().any(|line| line.contains(venv_name)))
    }

    async fn ensure_venv(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        if self.venv_exists(&ctx.venv_name).await? {
            return Ok(());
        }

        println!("> Create conda environment '{}'.", ctx.venv_name);
        Invocation::new(format!(
            "conda create --name {} python={} -y",
            ctx.venv_name, ctx.python_version
        ))
        .trace()
        .run()
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Toolchain for PythonToolchain {
    fn platform(&self) -> Platform {
        Platform::Python
    }

    async fn compile(&self, _ctx: &ToolchainContext) -> StagehandResult<()> {
        Err(unsupported_goal(Platform::Python, "compile"))
    }

    async fn unit_test(&self, ctx: &ToolchainContext) -> StagehandResult<()> {
        require_tool("conda")?;
        self.ensure_venv(ctx).await?;

        let requirements =
            ctx.requirements_path
                .as_deref()
                .ok_or_else(|| StagehandError::InvalidInput {
                    name: "REQUIREMENTS_TXT_PATH".to_string(),
                    reason: "required for the python unit-test goal".to_string(),
                })?;

        Invocation::new(format!(
            "conda run -n {} pip install -r {}",
            ctx.venv_name,
            requirements.display()
        ))
        .trace()
        .run()
        .await?;

        let goal = ctx.goal_or(format!(
            "python -m xmlrunner discover -s {} -o {}",
            ctx.work_dir.display(),
            ctx.output_dir.display()
        ));

        Invocation::new(format!("conda run -n {} {}", ctx.venv_name, goal))
            .trace()
            .echo(&[EchoStream::Stdout, EchoStream::Stderr])
            .run()
            .await?;

        Ok(())
    }
}
