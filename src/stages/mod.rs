// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Pipeline stage functions
//!
//! One module per stage. Each stage is invoked as a separate process by the
//! pipeline orchestrator; its parameters arrive as an explicit argument
//! record bound to environment variables at the process boundary, and the
//! build diary is the only state shared between stages.

pub mod build_number;
pub mod clone;
pub mod compile;
pub mod docker;
pub mod helm;
pub mod unit_test;
pub mod workspace;
pub mod write_diary;

use std::path::Path;
use std::str::FromStr;

use crate::errors::{StagehandError, StagehandResult};
use crate::invoker::Invocation;

/// The named phases of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Bootstrap,
    Build,
    UnitTest,
    Deployment,
}

impl FromStr for PipelineStage {
    type Err = StagehandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BOOTSTRAP" => Ok(Self::Bootstrap),
            "BUILD" => Ok(Self::Build),
            "UNIT_TEST" => Ok(Self::UnitTest),
            "DEPLOYMENT" => Ok(Self::Deployment),
            other => Err(StagehandError::UnsupportedStage {
                stage: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bootstrap => write!(f, "BOOTSTRAP"),
            Self::Build => write!(f, "BUILD"),
            Self::UnitTest => write!(f, "UNIT_TEST"),
            Self::Deployment => write!(f, "DEPLOYMENT"),
        }
    }
}

/// List a directory into the pipeline log
pub(crate) async fn list_dir(path: &Path) -> StagehandResult<()> {
    Invocation::new(format!("ls -la {}", path.display()))
        .run()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parses_known_names() {
        assert_eq!(
            PipelineStage::from_str("BOOTSTRAP").unwrap(),
            PipelineStage::Bootstrap
        );
        assert_eq!(
            PipelineStage::from_str("unit_test").unwrap(),
            PipelineStage::UnitTest
        );
    }

    #[test]
    fn test_unknown_stage_fails() {
        let err = PipelineStage::from_str("SMOKE_TEST").unwrap_err();
        assert!(matches!(err, StagehandError::UnsupportedStage { .. }));
    }
}
