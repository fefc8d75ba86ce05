// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Helm upgrade stage
//!
//! Reads the diary, pulls the chart from the OCI registry, stages the
//! per-environment kubernetes resources into it, resolves the container
//! environment variables, and runs `helm upgrade --install`.

use base64::Engine;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use super::list_dir;
use crate::cli::parse_flag;
use crate::diary::BuildDiary;
use crate::errors::{StagehandError, StagehandResult};
use crate::fsops;
use crate::invoker::{require_tool, EchoStream, Invocation};

/// Container entry the chart's values address env vars under
const TARGET_CONTAINER_NAME: &str = "mainApp";

/// File the decoded kubeconfig is written to, relative to the work dir
const KUBE_CONFIG_FILE_NAME: &str = ".config";

/// Parameters for the helm-upgrade stage
#[derive(Args, Debug, Clone)]
pub struct HelmUpgradeArgs {
    #[clap(long, env = "DEPLOYMENT_WORK_DIR")]
    pub deployment_work_dir: PathBuf,

    #[clap(long, env = "PUBLISH_FILE_PATH")]
    pub publish_file_path: PathBuf,

    /// Target deployment environment (dev, sit, uat, prod)
    #[clap(long, env = "ENVIRONMENT")]
    pub environment: String,

    #[clap(long, env = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Helm release name
    #[clap(long, env = "PROJECT_NAME")]
    pub project_name: String,

    /// Kubernetes resource tree relative to the project path
    #[clap(long, env = "K8S_RESOURCES", default_value = "k8s_resources")]
    pub k8s_resources: String,

    /// Base64-encoded kubeconfig content
    #[clap(long, env = "KUBE_CONFIG_CONTENT", hide_env_values = true)]
    pub kube_config_content: String,

    #[clap(long, env = "HELM_CHART_NAME")]
    pub helm_chart_name: String,

    #[clap(long, env = "HELM_CHART_VERSION")]
    pub helm_chart_version: String,

    #[clap(long, env = "HELM_SERVER_URI")]
    pub helm_server_uri: String,

    #[clap(long, env = "HELM_SERVER_USERNAME")]
    pub helm_server_username: String,

    #[clap(long, env = "HELM_SERVER_PASSWORD", hide_env_values = true)]
    pub helm_server_password: String,

    /// Try the secret-store naming convention (`_` -> `-`) before the
    /// literal name when resolving private values
    #[clap(long, env = "IS_SCAN_SECRETS_VAULT", value_parser = parse_flag, default_value = "true")]
    pub is_scan_secrets_vault: bool,
}

/// Execute the helm-upgrade stage
pub async fn run(args: HelmUpgradeArgs) -> StagehandResult<()> {
    let environment = args.environment.to_lowercase();

    println!("> Validate publish file.");
    let diary = BuildDiary::from_file(&args.publish_file_path)?;
    let image_tag = diary.image_tag_for(&environment)?;

    require_tool("helm")?;

    println!("> Helm login registry server.");
    Invocation::new(format!(
        "echo {} | helm registry login {} --username {} --password-stdin",
        args.helm_server_password, args.helm_server_uri, args.helm_server_username
    ))
    .echo(&[EchoStream::Stdout, EchoStream::Stderr])
    .run()
    .await?;

    println!("> Helm pull chart.");
    fs::create_dir_all(&args.deployment_work_dir)?;
    Invocation::new(format!(
        "helm pull oci://{}/helm/{} --version {} --untar",
        args.helm_server_uri, args.helm_chart_name, args.helm_chart_version
    ))
    .cwd(&args.deployment_work_dir)
    .echo(&[EchoStream::Stdout, EchoStream::Stderr])
    .run()
    .await?;
    list_dir(&args.deployment_work_dir).await?;

    let kube_config_path = write_kube_config(
        &args.deployment_work_dir.join(KUBE_CONFIG_FILE_NAME),
        &args.kube_config_content,
    )?;

    let chart_path = args.deployment_work_dir.join(&args.helm_chart_name);
    let k8s_resources_path = args.project_path.join(&args.k8s_resources);
    stage_chart_resources(&chart_path, &k8s_resources_path, &environment).await?;

    let set_args = container_env_args(&diary, args.is_scan_secrets_vault)?;
    let upgrade_cmd = helm_upgrade_command(
        &args.project_name,
        &chart_path,
        &k8s_resources_path.join("base/values.yaml"),
        &k8s_resources_path.join(format!("{}/values.yaml", environment)),
        &diary.docker_server_uri,
        &diary.image_name,
        image_tag,
        &set_args,
    );

    Invocation::new(upgrade_cmd)
        .cwd(&chart_path)
        .env("KUBECONFIG", kube_config_path.display().to_string())
        .trace()
        .echo(&[EchoStream::Stdout, EchoStream::Stderr])
        .run()
        .await?;

    Ok(())
}

/// Decode the base64 kubeconfig to a file readable only by the agent user
fn write_kube_config(path: &Path, encoded: &str) -> StagehandResult<PathBuf> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| StagehandError::InvalidInput {
            name: "KUBE_CONFIG_CONTENT".to_string(),
            reason: format!("invalid base64: {}", e),
        })?;

    fs::write(path, decoded).map_err(|e| StagehandError::FileWriteError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(path.canonicalize()?)
}

/// Copy base and environment configmap/secret resources into the chart
async fn stage_chart_resources(
    chart_path: &Path,
    k8s_resources_path: &Path,
    environment: &str,
) -> StagehandResult<()> {
    let configmap_dest = chart_path.join("resources/configmap");
    let secret_dest = chart_path.join("resources/secret");
    fs::create_dir_all(&configmap_dest)?;
    fs::create_dir_all(&secret_dest)?;

    println!("Verify content of the k8s resources.");
    list_dir(k8s_resources_path).await?;

    println!("Copy resources to corresponding locations.");
    // Base first, then the target environment so env-specific files win.
    fsops::copy_dir_contents(&k8s_resources_path.join("base/configmap"), &configmap_dest)?;
    fsops::copy_dir_contents(&k8s_resources_path.join("base/secret"), &secret_dest)?;
    fsops::copy_dir_contents(
        &k8s_resources_path.join(environment).join("configmap"),
        &configmap_dest,
    )?;
    fsops::copy_dir_contents(
        &k8s_resources_path.join(environment).join("secret"),
        &secret_dest,
    )?;

    println!("Verify content of the helm chart.");
    list_dir(chart_path).await
}

/// Build the `--set` arguments injecting container env vars
///
/// Public entries carry their literal diary values; private entries carry
/// names only and are resolved from the ambient environment here, never
/// from the diary.
fn container_env_args(diary: &BuildDiary, scan_vault: bool) -> StagehandResult<Vec<String>> {
    let mut set_args = Vec::new();

    for (name, value) in &diary.container_required_envs.public {
        set_args.push(set_arg("common", name, value));
    }

    for name in &diary.container_required_envs.private {
        let value = resolve_ambient_env(name, scan_vault)?;
        set_args.push(set_arg("secret", name, &value));
    }

    Ok(set_args)
}

fn set_arg(group: &str, name: &str, value: &str) -> String {
    format!(
        "--set deployment.containers.{}.env.{}.{}={}",
        TARGET_CONTAINER_NAME, group, name, value
    )
}

/// Resolve a private env var from the ambient environment
///
/// Secret stores commonly map `_` to `-` in mounted variable names, so that
/// form is tried first when vault scanning is on.
fn resolve_ambient_env(name: &str, scan_vault: bool) -> StagehandResult<String> {
    if scan_vault {
        if let Ok(value) = std::env::var(name.replace('_', "-")) {
            return Ok(value);
        }
    }

    std::env::var(name).map_err(|_| StagehandError::InvalidInput {
        name: name.to_string(),
        reason: "private container env var is not set in the deployment environment".to_string(),
    })
}

#[allow(clippy::too_many_arguments)]
fn helm_upgrade_command(
    project_name: &str,
    chart_path: &Path,
    values_base: &Path,
    values_env: &Path,
    docker_server_uri: &str,
    image_name: &str,
    image_tag: &str,
    set_args: &[String],
) -> String {
    let mut cmd = format!(
        "helm upgrade --install --wait --force {} {} -f {} -f {} \
         --set deployment.containers.{}.image.repository={}/{} \
         --set deployment.containers.{}.image.tag={}",
        project_name,
        chart_path.display(),
        values_base.display(),
        values_env.display(),
        TARGET_CONTAINER_NAME,
        docker_server_uri,
        image_name,
        TARGET_CONTAINER_NAME,
        image_tag
    );

    for arg in set_args {
        cmd.push(' ');
        cmd.push_str(arg);
    }

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::ContainerRequiredEnvs;
    use std::collections::BTreeMap;

    #[test]
    fn test_set_arg_addresses_the_main_container() {
        assert_eq!(
            set_arg("common", "GIT_URL", "https://example.com/app.git"),
            "--set deployment.containers.mainApp.env.common.GIT_URL=https://example.com/app.git"
        );
        assert_eq!(
            set_arg("secret", "DB_PASSWORD", "x"),
            "--set deployment.containers.mainApp.env.secret.DB_PASSWORD=x"
        );
    }

    #[test]
    fn test_resolve_prefers_vault_form() {
        std::env::set_var("HELM-PROBE-SECRET", "from-vault");
        std::env::set_var("HELM_PROBE_SECRET", "plain");

        assert_eq!(
            resolve_ambient_env("HELM_PROBE_SECRET", true).unwrap(),
            "from-vault"
        );
        assert_eq!(
            resolve_ambient_env("HELM_PROBE_SECRET", false).unwrap(),
            "plain"
        );
    }

    #[test]
    fn test_resolve_missing_private_env_fails() {
        let err = resolve_ambient_env("HELM_PROBE_MISSING", true).unwrap_err();
        assert!(matches!(err, StagehandError::InvalidInput { .. }));
    }

    #[test]
    fn test_container_env_args_groups_public_and_private() {
        std::env::set_var("HELM_PROBE_API_KEY", "k");

        let mut public = BTreeMap::new();
        public.insert("FEATURE_FLAG".to_string(), "on".to_string());

        let mut diary = sample_diary();
        diary.container_required_envs = ContainerRequiredEnvs {
            public,
            private: vec!["HELM_PROBE_API_KEY".to_string()],
        };

        let set_args = container_env_args(&diary, false).unwrap();
        assert_eq!(
            set_args,
            vec![
                "--set deployment.containers.mainApp.env.common.FEATURE_FLAG=on".to_string(),
                "--set deployment.containers.mainApp.env.secret.HELM_PROBE_API_KEY=k".to_string(),
            ]
        );
    }

    #[test]
    fn test_kube_config_is_decoded_with_restricted_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(KUBE_CONFIG_FILE_NAME);
        let encoded = base64::engine::general_purpose::STANDARD.encode("apiVersion: v1\n");

        let path = write_kube_config(&target, &encoded).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "apiVersion: v1\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_helm_upgrade_command_layout() {
        let cmd = helm_upgrade_command(
            "app",
            Path::new("/work/chart"),
            Path::new("/k8s/base/values.yaml"),
            Path::new("/k8s/prod/values.yaml"),
            "registry.example.com",
            "app",
            "prod.1.0.0",
            &[set_arg("common", "A", "1")],
        );

        assert!(cmd.starts_with("helm upgrade --install --wait --force app /work/chart"));
        assert!(cmd.contains("-f /k8s/base/values.yaml -f /k8s/prod/values.yaml"));
        assert!(cmd.contains(
            "--set deployment.containers.mainApp.image.repository=registry.example.com/app"
        ));
        assert!(cmd.contains("--set deployment.containers.mainApp.image.tag=prod.1.0.0"));
        assert!(cmd.ends_with("--set deployment.containers.mainApp.env.common.A=1"));
    }

    fn sample_diary() -> BuildDiary {
        let mut image_tags = BTreeMap::new();
        image_tags.insert("base".to_string(), "1.0.0".to_string());

        BuildDiary {
            git_url: "https://example.com/app.git".into(),
            git_commit_id: "0123456789abcdef".into(),
            git_short_commit_id: "01234567".into(),
            pipeline_name: "app-ci".into(),
            build_number: "20250101.7".into(),
            docker_server_uri: "registry.example.com".into(),
            is_image_tag_based_on_env: false,
            image_name: "app".into(),
            image_tags,
            container_required_envs: ContainerRequiredEnvs::default(),
        }
    }
}
