// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Docker build stage
//!
//! Reads the diary, stages the build output and docker resources into the
//! docker build directory, then builds and pushes the image under the
//! effective tag.

use clap::Args;
use std::path::PathBuf;

use super::list_dir;
use crate::cli::parse_flag;
use crate::diary::BuildDiary;
use crate::errors::{StagehandError, StagehandResult};
use crate::fsops;
use crate::invoker::{require_tool, EchoStream, Invocation};

/// Parameters for the docker-build stage
#[derive(Args, Debug, Clone)]
pub struct DockerBuildArgs {
    #[clap(long, env = "PUBLISH_FILE_PATH")]
    pub publish_file_path: PathBuf,

    #[clap(long, env = "DOCKER_RESOURCE_WORK_DIR")]
    pub docker_resource_work_dir: PathBuf,

    /// Dockerfile bundle name under the resource work dir
    #[clap(long, env = "DOCKER_TARGET_DOCKERFILE")]
    pub docker_target_dockerfile: String,

    /// Glob for the compiled artifacts to stage
    #[clap(long, env = "TARGET_BUILD_OUTPUT_PATH")]
    pub target_build_output_path: String,

    #[clap(long, env = "TARGET_BUILD_DOCKER_PATH")]
    pub target_build_docker_path: PathBuf,

    /// Build context passed to docker build
    #[clap(long, env = "DOCKER_BUILD_PATH", default_value = ".")]
    pub docker_build_path: String,

    /// JSON array of single-entry objects turned into --build-arg pairs
    #[clap(long, env = "DOCKER_ARGS_JSON")]
    pub docker_args_json: Option<String>,

    #[clap(long, env = "DOCKER_NO_CACHE", value_parser = parse_flag, default_value = "false")]
    pub docker_no_cache: bool,

    #[clap(long, env = "DOCKER_IS_PRIVATE_REGISTRY", value_parser = parse_flag, default_value = "false")]
    pub docker_is_private_registry: bool,

    #[clap(long, env = "DOCKER_SERVER_USERNAME")]
    pub docker_server_username: Option<String>,

    #[clap(long, env = "DOCKER_SERVER_PASSWORD", hide_env_values = true)]
    pub docker_server_password: Option<String>,

    /// Deployment environment selecting the per-environment tag
    #[clap(long, env = "DOCKER_IMAGE_TAG_TARGET_ENV", default_value = "")]
    pub docker_image_tag_target_env: String,
}

/// Execute the docker-build stage
pub async fn run(args: DockerBuildArgs) -> StagehandResult<()> {
    println!("> Extract required data from publish file.");
    let diary = BuildDiary::from_file(&args.publish_file_path)?;
    let image_tag = diary.image_tag_for(&args.docker_image_tag_target_env)?;
    let image_ref = format!(
        "{}/{}:{}",
        diary.docker_server_uri, diary.image_name, image_tag
    );

    println!("> Prepare resources to build Docker image.");
    let docker_resource_path = args
        .docker_resource_work_dir
        .join(&args.docker_target_dockerfile);
    println!("Target build output path: {}", args.target_build_output_path);
    println!(
        "Target build Docker path: {}",
        args.target_build_docker_path.display()
    );
    println!(
        "Target Docker resource path: {}",
        docker_resource_path.display()
    );
    list_dir(&docker_resource_path).await?;

    fsops::copy_matching(&args.target_build_output_path, &args.target_build_docker_path)?;
    // The bundle's contents are flattened into the build dir (not copied as
    // a subdirectory) so the Dockerfile sits at the root the default `.`
    // build context resolves against.
    fsops::copy_dir_contents(&docker_resource_path, &args.target_build_docker_path)?;
    list_dir(&args.target_build_docker_path).await?;

    require_tool("docker")?;

    if args.docker_is_private_registry {
        println!("> Docker login.");
        let (username, password) = match (
            args.docker_server_username.as_deref(),
            args.docker_server_password.as_deref(),
        ) {
            (Some(u), Some(p)) => (u, p),
            _ => {
                return Err(StagehandError::InvalidInput {
                    name: "DOCKER_SERVER_USERNAME/DOCKER_SERVER_PASSWORD".to_string(),
                    reason: "required when DOCKER_IS_PRIVATE_REGISTRY is set".to_string(),
                })
            }
        };

        // Password travels via stdin pipe; the command line is not traced.
        Invocation::new(format!(
            "echo {} | docker login {} -u {} --password-stdin",
            password, diary.docker_server_uri, username
        ))
        .echo(&[EchoStream::Stdout, EchoStream::Stderr])
        .run()
        .await?;
    }

    println!("> Start build the Docker image.");
    let build_args = build_args_from_json(args.docker_args_json.as_deref())?;
    let build_cmd = docker_build_command(
        &image_ref,
        &args.docker_build_path,
        args.docker_no_cache,
        &build_args,
    );

    Invocation::new(build_cmd)
        .cwd(&args.target_build_docker_path)
        .trace()
        .echo(&[EchoStream::Stderr])
        .run()
        .await?;

    Invocation::new(format!("docker push {}", image_ref))
        .cwd(&args.target_build_docker_path)
        .run()
        .await?;

    Ok(())
}

/// Decode the JSON-encoded build args into `--build-arg K=V` tokens
fn build_args_from_json(json: Option<&str>) -> StagehandResult<Vec<String>> {
    let Some(raw) = json.filter(|s| !s.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let entries: Vec<std::collections::BTreeMap<String, String>> = serde_json::from_str(raw)
        .map_err(|e| StagehandError::invalid_json_input("DOCKER_ARGS_JSON", &e))?;

    let mut tokens = Vec::new();
    for entry in entries {
        for (key, value) in entry {
            tokens.push("--build-arg".to_string());
            tokens.push(format!("{}={}", key, value));
        }
    }

    Ok(tokens)
}

/// Assemble the docker build command line
fn docker_build_command(
    image_ref: &str,
    build_context: &str,
    no_cache: bool,
    build_args: &[String],
) -> String {
    let mut cmd = format!(
        "docker build --platform linux/amd64 -t {} {}",
        image_ref, build_context
    );

    if no_cache {
        cmd.push_str(" --no-cache");
    }
    for token in build_args {
        cmd.push(' ');
        cmd.push_str(token);
    }

    cmd
}
