// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Build diary record
//!
//! The diary is the only channel of cross-process communication between
//! pipeline stages: the build stage writes it once, containerization and
//! deployment stages read it verbatim. It is never mutated after writing,
//! so a round-trip must reproduce every field exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{StagehandError, StagehandResult};

/// Key under which the shared image tag is stored when tagging is not
/// per-environment
pub const BASE_TAG_KEY: &str = "base";

/// Container environment requirements carried in the diary
///
/// `public` maps names to literal values injected into every deployment.
/// `private` holds names only; their values are resolved from the ambient
/// environment at deployment time and are never persisted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRequiredEnvs {
    #[serde(default)]
    pub public: BTreeMap<String, String>,

    #[serde(default)]
    pub private: Vec<String>,
}

/// The build diary ("publisher" record)
///
/// Produced at the end of the build stage, consumed by docker-build and
/// helm-upgrade within the same pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDiary {
    /// Source repository URL
    pub git_url: String,

    /// Full commit id of the built revision
    pub git_commit_id: String,

    /// First eight characters of the commit id
    pub git_short_commit_id: String,

    /// Name of the pipeline that produced this diary
    pub pipeline_name: String,

    /// Build number of the producing run
    pub build_number: String,

    /// Target container registry
    pub docker_server_uri: String,

    /// Selects per-environment tags over the single `base` tag
    #[serde(default)]
    pub is_image_tag_based_on_env: bool,

    /// Image name within the registry
    pub image_name: String,

    /// Environment name (or `base`) to tag string
    pub image_tags: BTreeMap<String, String>,

    /// Environment variables required by the container at deploy time
    pub container_required_envs: ContainerRequiredEnvs,
}

impl BuildDiary {
    /// Load a diary written by an earlier stage
    ///
    /// The attempted path is printed before raising so the pipeline log
    /// shows where the lookup happened.
    pub fn from_file(path: &Path) -> StagehandResult<Self> {
        if !path.exists() {
            eprintln!("File does not exist: {}.", path.display());
            return Err(StagehandError::DiaryNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a diary from a JSON string
    pub fn from_json(json: &str) -> StagehandResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Serialize to pretty-printed JSON (the on-disk and log format)
    pub fn to_json(&self) -> StagehandResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Persist the diary as pretty-printed UTF-8 JSON
    pub fn write_to(&self, path: &Path) -> StagehandResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| StagehandError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Resolve the effective image tag for a deployment environment
    ///
    /// With per-environment tagging the environment must have been recorded
    /// at write time; otherwise the shared `base` tag applies.
    pub fn image_tag_for(&self, environment: &str) -> StagehandResult<&str> {
        let key = if self.is_image_tag_based_on_env {
            environment
        } else {
            BASE_TAG_KEY
        };

        self.image_tags
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| StagehandError::ImageTagNotFound {
                environment: key.to_string(),
            })
    }
}
