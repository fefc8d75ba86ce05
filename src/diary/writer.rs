// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Diary assembly (write side)
//!
//! Builds a [`BuildDiary`] from the raw, partly JSON-encoded inputs the
//! pipeline hands the write-diary stage.

use std::collections::BTreeMap;

use crate::diary::record::{BuildDiary, ContainerRequiredEnvs, BASE_TAG_KEY};
use crate::errors::{StagehandError, StagehandResult};

/// The five provenance variables injected into `public` when the
/// default-public-envs flag is set
pub const DEFAULT_PUBLIC_ENV_KEYS: [&str; 5] = [
    "GIT_URL",
    "GIT_COMMIT_ID",
    "GIT_SHORT_COMMIT_ID",
    "PIPELINE_NAME",
    "BUILD_NUMBER",
];

/// Raw inputs for assembling a diary
///
/// Collected once at the process boundary from the stage's environment
/// variables; `assemble` is a pure function of this record.
#[derive(Debug, Clone, Default)]
pub struct DiaryInputs {
    pub git_url: String,
    pub git_commit_id: String,
    pub git_short_commit_id: String,
    pub pipeline_name: String,
    pub build_number: String,
    pub docker_server_uri: String,
    pub image_name: String,

    /// The base tag value (e.g. `1.0.0`)
    pub image_tag: String,

    /// Per-environment tagging switch
    pub is_image_tag_based_on_env: bool,

    /// JSON array of environment names, required when per-environment
    /// tagging is on (e.g. `["dev","prod"]`)
    pub multi_tag_envs_json: Option<String>,

    /// Merge the five provenance defaults into `public`
    pub use_default_public_envs: bool,

    /// JSON array of single-entry objects: `[{"NAME":"value"}, ...]`
    pub public_envs_json: Option<String>,

    /// JSON array of names whose values are resolved at deploy time
    pub private_envs_json: Option<String>,
}

impl DiaryInputs {
    /// Assemble the diary record
    pub fn assemble(&self) -> StagehandResult<BuildDiary> {
        Ok(BuildDiary {
            git_url: self.git_url.clone(),
            git_commit_id: self.git_commit_id.clone(),
            git_short_commit_id: self.git_short_commit_id.clone(),
            pipeline_name: self.pipeline_name.clone(),
            build_number: self.build_number.clone(),
            docker_server_uri: self.docker_server_uri.clone(),
            is_image_tag_based_on_env: self.is_image_tag_based_on_env,
            image_name: self.image_name.clone(),
            image_tags: self.build_image_tags()?,
            container_required_envs: self.build_required_envs()?,
        })
    }

    /// Build the tag mapping
    ///
    /// Per-environment tags are literally prefixed with the environment name
    /// and a dot (`dev.1.0.0`); downstream values files key on that form.
    fn build_image_tags(&self) -> StagehandResult<BTreeMap<String, String>> {
        let mut tags = BTreeMap::new();

        if self.is_image_tag_based_on_env {
            let raw = self.multi_tag_envs_json.as_deref().unwrap_or_default();
            let envs: Vec<String> = serde_json::from_str(raw).map_err(|e| {
                StagehandError::invalid_json_input("DOCKER_MULTIPLE_TAGS_ENVS", &e)
            })?;

            for env in envs {
                let tag = format!("{}.{}", env, self.image_tag);
                tags.insert(env, tag);
            }
        } else {
            tags.insert(BASE_TAG_KEY.to_string(), self.image_tag.clone());
        }

        Ok(tags)
    }

    fn build_required_envs(&self) -> StagehandResult<ContainerRequiredEnvs> {
        let mut public = BTreeMap::new();

        if let Some(raw) = non_empty(self.public_envs_json.as_deref()) {
            let entries: Vec<BTreeMap<String, String>> = serde_json::from_str(raw)
                .map_err(|e| StagehandError::invalid_json_input("PUBLIC_ENV_VARS", &e))?;
            for entry in entries {
                public.extend(entry);
            }
        }

        if self.use_default_public_envs {
            public.insert("GIT_URL".to_string(), self.git_url.clone());
            public.insert("GIT_COMMIT_ID".to_string(), self.git_commit_id.clone());
            public.insert(
                "GIT_SHORT_COMMIT_ID".to_string(),
                self.git_short_commit_id.clone(),
            );
            public.insert("PIPELINE_NAME".to_string(), self.pipeline_name.clone());
            public.insert("BUILD_NUMBER".to_string(), self.build_number.clone());
        }

        let private = match non_empty(self.private_envs_json.as_deref()) {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| StagehandError::invalid_json_input("PRIVATE_ENV_VARS", &e))?,
            None => Vec::new(),
        };

        Ok(ContainerRequiredEnvs { public, private })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> DiaryInputs {
        DiaryInputs {
            git_url: "https://example.com/app.git".into(),
            git_commit_id: "0123456789abcdef".into(),
            git_short_commit_id: "01234567".into(),
            pipeline_name: "app-ci".into(),
            build_number: "20250101.7".into(),
            docker_server_uri: "registry.example.com".into(),
            image_name: "app".into(),
            image_tag: "1.0.0".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_env_based_tags_are_prefixed() {
        let mut inputs = base_inputs();
        inputs.is_image_tag_based_on_env = true;
        inputs.multi_tag_envs_json = Some(r#"["dev","prod"]"#.into());

        let diary = inputs.assemble().unwrap();
        assert_eq!(diary.image_tags.len(), 2);
        assert_eq!(diary.image_tags["dev"], "dev.1.0.0");
        assert_eq!(diary.image_tags["prod"], "prod.1.0.0");
    }

    #[test]
    fn test_base_tag_when_not_env_based() {
        let diary = base_inputs().assemble().unwrap();
        assert_eq!(diary.image_tags.len(), 1);
        assert_eq!(diary.image_tags[BASE_TAG_KEY], "1.0.0");
    }

    #[test]
    fn test_env_based_tags_require_env_list() {
        let mut inputs = base_inputs();
        inputs.is_image_tag_based_on_env = true;

        let err = inputs.assemble().unwrap_err();
        assert!(matches!(err, StagehandError::InvalidInput { .. }));
    }

    #[test]
    fn test_default_public_envs_merge_without_manual_entries() {
        let mut inputs = base_inputs();
        inputs.use_default_public_envs = true;

        let diary = inputs.assemble().unwrap();
        let public = &diary.container_required_envs.public;
        for key in DEFAULT_PUBLIC_ENV_KEYS {
            assert!(public.contains_key(key), "missing default key {}", key);
        }
        assert_eq!(public["BUILD_NUMBER"], "20250101.7");
    }

    #[test]
    fn test_defaults_override_manual_entries() {
        let mut inputs = base_inputs();
        inputs.use_default_public_envs = true;
        inputs.public_envs_json =
            Some(r#"[{"GIT_URL":"stale"},{"FEATURE_FLAG":"on"}]"#.into());

        let diary = inputs.assemble().unwrap();
        let public = &diary.container_required_envs.public;
        assert_eq!(public["GIT_URL"], "https://example.com/app.git");
        assert_eq!(public["FEATURE_FLAG"], "on");
    }

    #[test]
    fn test_private_envs_are_names_only() {
        let mut inputs = base_inputs();
        inputs.private_envs_json = Some(r#"["DB_PASSWORD","API_KEY"]"#.into());

        let diary = inputs.assemble().unwrap();
        assert_eq!(
            diary.container_required_envs.private,
            vec!["DB_PASSWORD".to_string(), "API_KEY".to_string()]
        );
    }

    #[test]
    fn test_malformed_public_envs_is_invalid_input() {
        let mut inputs = base_inputs();
        inputs.public_envs_json = Some("{not json".into());

        let err = inputs.assemble().unwrap_err();
        assert!(matches!(err, StagehandError::InvalidInput { .. }));
    }
}
