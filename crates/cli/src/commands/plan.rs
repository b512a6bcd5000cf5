use anyhow::{Context, Result};
use serde::Serialize;
use site_deploy_core::config::{build_dir_from_env, load_file_config};
use site_deploy_deployer::plan;
use std::fs;
use std::path::PathBuf;

/// One row of the upload plan
#[derive(Debug, Serialize)]
struct PlannedUpload<'a> {
    key: &'a str,
    content_type: &'a str,
    cache_control: &'a str,
    bytes: u64,
}

/// Print every object `deploy` would write, resolving the build directory
/// the same way it does
pub fn run(build_dir: Option<PathBuf>, config_path: Option<PathBuf>, json: bool) -> Result<()> {
    let build_dir = match build_dir {
        Some(dir) => dir,
        None => {
            let file = load_file_config(config_path.as_deref())
                .context("Failed to load settings file")?;
            build_dir_from_env(&file)
        }
    };

    if !build_dir.is_dir() {
        anyhow::bail!("Build directory not found: {}", build_dir.display());
    }

    let entries = plan(&build_dir)?;
    let rows = entries
        .iter()
        .map(|entry| {
            let bytes = fs::metadata(&entry.source)
                .with_context(|| format!("Failed to stat {}", entry.source.display()))?
                .len();
            Ok(PlannedUpload {
                key: &entry.key,
                content_type: entry.content_type,
                cache_control: entry.cache_policy.header_value(),
                bytes,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("📋 Upload plan for {} ({} files)", build_dir.display(), rows.len());
    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    for row in &rows {
        println!(
            "   {:<width$}  {:<30}  {}",
            row.key,
            row.content_type,
            row.cache_control,
            width = width
        );
    }

    let total: u64 = rows.iter().map(|r| r.bytes).sum();
    println!("   Total: {} bytes", total);

    Ok(())
}
