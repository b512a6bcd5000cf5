use anyhow::{Context, Result};
use site_deploy_core::DeployConfig;
use site_deploy_core::config::load_file_config;
use site_deploy_deployer::{AwsBackend, Deployer};
use std::path::PathBuf;

/// Resolve configuration once, then run the deploy pipeline against AWS
pub async fn run(build_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(build_dir, config_path)?;

    tracing::info!(
        bucket = %config.bucket,
        region = %config.region,
        distribution_id = ?config.distribution_id,
        build_dir = %config.build_dir.display(),
        "configuration resolved"
    );

    let backend = AwsBackend::new(&config.region).await;
    let deployer = Deployer::new(config, backend);
    let summary = deployer.deploy().await?;

    tracing::info!(
        files_uploaded = summary.files_uploaded,
        invalidation_id = ?summary.invalidation_id,
        "deploy finished"
    );
    Ok(())
}

fn resolve_config(
    build_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<DeployConfig> {
    let file =
        load_file_config(config_path.as_deref()).context("Failed to load settings file")?;
    let config = DeployConfig::from_env(file)?;

    Ok(match build_dir {
        Some(dir) => config.with_build_dir(dir),
        None => config,
    })
}
