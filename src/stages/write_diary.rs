// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Write-diary stage
//!
//! Assembles the build diary from the stage's inputs, persists it, echoes
//! it into the pipeline log, and tags the run with the short commit id.

use clap::Args;
use std::path::PathBuf;

use crate::bridge;
use crate::cli::parse_flag;
use crate::diary::{DiaryInputs, DEFAULT_DIARY_FILE_NAME};
use crate::errors::StagehandResult;

/// Parameters for the write-diary stage
#[derive(Args, Debug, Clone)]
pub struct WriteDiaryArgs {
    #[clap(long, env = "PUBLISH_PREFIX_PATH", default_value = ".")]
    pub publish_prefix_path: PathBuf,

    #[clap(long, env = "PUBLISH_FILE_NAME", default_value = DEFAULT_DIARY_FILE_NAME)]
    pub publish_file_name: String,

    #[clap(long, env = "GIT_URL")]
    pub git_url: String,

    #[clap(long, env = "GIT_COMMIT_ID")]
    pub git_commit_id: String,

    #[clap(long, env = "GIT_SHORT_COMMIT_ID")]
    pub git_short_commit_id: String,

    #[clap(long, env = "PIPELINE_NAME")]
    pub pipeline_name: String,

    #[clap(long, env = "BUILD_NUMBER")]
    pub build_number: String,

    #[clap(long, env = "DOCKER_SERVER_URI")]
    pub docker_server_uri: String,

    #[clap(long, env = "DOCKER_IMAGE_NAME")]
    pub image_name: String,

    #[clap(long, env = "DOCKER_IMAGE_TAG")]
    pub image_tag: String,

    #[clap(long, env = "IS_IMAGE_TAG_BASED_ON_ENV", value_parser = parse_flag, default_value = "false")]
    pub is_image_tag_based_on_env: bool,

    /// JSON array of environment names, e.g. ["dev","prod"]
    #[clap(long, env = "DOCKER_MULTIPLE_TAGS_ENVS")]
    pub docker_multiple_tags_envs: Option<String>,

    #[clap(long, env = "IS_DEFAULT_PUBLIC_ENVS", value_parser = parse_flag, default_value = "true")]
    pub is_default_public_envs: bool,

    /// JSON array of single-entry objects, e.g. [{"NAME":"value"}]
    #[clap(long, env = "PUBLIC_ENV_VARS")]
    pub public_env_vars: Option<String>,

    /// JSON array of names resolved at deployment time
    #[clap(long, env = "PRIVATE_ENV_VARS")]
    pub private_env_vars: Option<String>,
}

/// Execute the write-diary stage
pub async fn run(args: WriteDiaryArgs) -> StagehandResult<()> {
    let inputs = DiaryInputs {
        git_url: args.git_url,
        git_commit_id: args.git_commit_id,
        git_short_commit_id: args.git_short_commit_id.clone(),
        pipeline_name: args.pipeline_name,
        build_number: args.build_number,
        docker_server_uri: args.docker_server_uri,
        image_name: args.image_name,
        image_tag: args.image_tag,
        is_image_tag_based_on_env: args.is_image_tag_based_on_env,
        multi_tag_envs_json: args.docker_multiple_tags_envs,
        use_default_public_envs: args.is_default_public_envs,
        public_envs_json: args.public_env_vars,
        private_envs_json: args.private_env_vars,
    };

    let diary = inputs.assemble()?;

    println!("Verify publisher.");
    println!("{}", diary.to_json()?);

    let publish_file_path = args.publish_prefix_path.join(&args.publish_file_name);
    diary.write_to(&publish_file_path)?;

    bridge::add_build_tag(&format!("commit_id={}", args.git_short_commit_id));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::BuildDiary;

    fn sample_args(dir: &std::path::Path) -> WriteDiaryArgs {
        WriteDiaryArgs {
            publish_prefix_path: dir.to_path_buf(),
            publish_file_name: DEFAULT_DIARY_FILE_NAME.to_string(),
            git_url: "https://example.com/app.git".into(),
            git_commit_id: "0123456789abcdef".into(),
            git_short_commit_id: "01234567".into(),
            pipeline_name: "app-ci".into(),
            build_number: "20250101.7".into(),
            docker_server_uri: "registry.example.com".into(),
            image_name: "app".into(),
            image_tag: "1.0.0".into(),
            is_image_tag_based_on_env: true,
            docker_multiple_tags_envs: Some(r#"["dev","prod"]"#.into()),
            is_default_public_envs: true,
            public_env_vars: None,
            private_env_vars: Some(r#"["DB_PASSWORD"]"#.into()),
        }
    }

    #[tokio::test]
    async fn test_stage_persists_readable_diary() {
        let dir = tempfile::tempdir().unwrap();
        run(sample_args(dir.path())).await.unwrap();

        let diary = BuildDiary::from_file(&dir.path().join(DEFAULT_DIARY_FILE_NAME)).unwrap();
        assert_eq!(diary.image_tags["dev"], "dev.1.0.0");
        assert_eq!(diary.image_tags["prod"], "prod.1.0.0");
        assert_eq!(
            diary.container_required_envs.public["BUILD_NUMBER"],
            "20250101.7"
        );
        assert_eq!(
            diary.container_required_envs.private,
            vec!["DB_PASSWORD".to_string()]
        );
    }
}
