// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Build/test toolchains
//!
//! One implementation per platform behind the [`Toolchain`] trait, selected
//! by explicit match over the closed [`Platform`] enum. Unsupported
//! platform/goal combinations fail loudly; there is no silent fallback arm.

mod dotnet;
mod maven;
mod npm;
mod python;

pub use dotnet::DotnetToolchain;
pub use maven::MavenToolchain;
pub use npm::NpmToolchain;
pub use python::PythonToolchain;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{StagehandError, StagehandResult};
use crate::fsops;

/// Build/test platform identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Maven,
    Dotnet,
    Npm,
    Python,
}

impl FromStr for Platform {
    type Err = StagehandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MAVEN" => Ok(Self::Maven),
            "DOTNET" => Ok(Self::Dotnet),
            "NPM" => Ok(Self::Npm),
            "PYTHON" => Ok(Self::Python),
            other => Err(StagehandError::UnsupportedPlatform {
                platform: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Maven => write!(f, "MAVEN"),
            Self::Dotnet => write!(f, "DOTNET"),
            Self::Npm => write!(f, "NPM"),
            Self::Python => write!(f, "PYTHON"),
        }
    }
}

/// Inputs a toolchain needs to run a compile or unit-test goal
#[derive(Debug, Clone, Default)]
pub struct ToolchainContext {
    /// Directory the toolchain runs in
    pub work_dir: PathBuf,

    /// Directory build/test artifacts land in
    pub output_dir: PathBuf,

    /// Caller-supplied goal command overriding the platform default
    pub goal: Option<String>,

    /// Fetch dependencies from a private repository
    pub use_private_libs: bool,

    /// Credential/config file to stage into the toolchain's native
    /// discovery location (settings.xml, NuGet.Config)
    pub credential_file: Option<PathBuf>,

    /// Environment build resources copied into the work dir (npm)
    pub env_resource_dir: Option<PathBuf>,

    /// Conda virtual environment name (python)
    pub venv_name: String,

    /// Python interpreter version for the venv
    pub python_version: String,

    /// requirements.txt path (python)
    pub requirements_path: Option<PathBuf>,
}

impl ToolchainContext {
    /// Pick the caller's goal or the platform default
    pub fn goal_or(&self, default: impl Into<String>) -> String {
        match self.goal.as_deref().map(str::trim) {
            Some(goal) if !goal.is_empty() => goal.to_string(),
            _ => default.into(),
        }
    }
}

/// A build/test toolchain
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// The platform this toolchain serves
    fn platform(&self) -> Platform;

    /// Compile/package the application
    async fn compile(&self, ctx: &ToolchainContext) -> StagehandResult<()>;

    /// Run the unit-test goal
    async fn unit_test(&self, ctx: &ToolchainContext) -> StagehandResult<()>;
}

/// Select the toolchain for a platform
pub fn toolchain_for(platform: Platform) -> Box<dyn Toolchain> {
    match platform {
        Platform::Maven => Box::new(MavenToolchain),
        Platform::Dotnet => Box::new(DotnetToolchain),
        Platform::Npm => Box::new(NpmToolchain),
        Platform::Python => Box::new(PythonToolchain),
    }
}

/// Stage a caller-supplied credential file into the toolchain's native
/// discovery location under the home directory
///
/// Emulates what each toolchain's credential lookup expects (`~/.m2`,
/// `~/.nuget/NuGet`).
pub(crate) fn stage_credential_file(
    credential_file: &Path,
    home_relative: &[&str],
) -> StagehandResult<PathBuf> {
    let base = directories::BaseDirs::new().ok_or(StagehandError::HomeDirNotFound)?;

    let mut dest = base.home_dir().to_path_buf();
    for part in home_relative {
        dest.push(part);
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    println!("Copying {} to {}", credential_file.display(), dest.display());
    fsops::copy_matching(&credential_file.to_string_lossy(), &dest)?;

    Ok(dest)
}

pub(crate) fn unsupported_goal(platform: Platform, goal: &str) -> StagehandError {
    StagehandError::UnsupportedGoal {
        platform: platform.to_string(),
        goal: goal.to_string(),
    }
}
