use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const BUCKET_VAR: &str = "AWS_S3_BUCKET";
pub const DISTRIBUTION_VAR: &str = "AWS_CLOUDFRONT_DISTRIBUTION_ID";
pub const REGION_VAR: &str = "AWS_REGION";
pub const BUILD_DIR_VAR: &str = "SITE_DEPLOY_BUILD_DIR";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BUILD_DIR: &str = "dist";

/// Picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "site-deploy.toml";

/// Optional settings file.
/// Every field may be overridden by the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    build_dir: Option<PathBuf>,
    #[serde(default)]
    aws: RawAwsConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAwsConfig {
    bucket: Option<String>,
    distribution_id: Option<String>,
    region: Option<String>,
}

/// Settings for one deploy, captured once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub bucket: String,
    /// CloudFront distribution; `None` disables cache invalidation
    pub distribution_id: Option<String>,
    pub region: String,
    pub build_dir: PathBuf,
}

impl DeployConfig {
    /// Resolve from the process environment layered over `file`
    pub fn from_env(file: FileConfig) -> Result<Self> {
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Resolve settings with `lookup` (environment) taking precedence over `file`.
    ///
    /// Blank values count as unset, so `AWS_CLOUDFRONT_DISTRIBUTION_ID=` turns
    /// invalidation off rather than sending an empty id.
    pub fn resolve<F>(file: FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let build_dir = resolve_build_dir(&file, &lookup);
        let env = |name: &str| non_blank(lookup(name));

        let bucket = env(BUCKET_VAR)
            .or_else(|| non_blank(file.aws.bucket))
            .ok_or_else(|| Error::missing_setting(BUCKET_VAR))?;

        let distribution_id =
            env(DISTRIBUTION_VAR).or_else(|| non_blank(file.aws.distribution_id));

        let region = env(REGION_VAR)
            .or_else(|| non_blank(file.aws.region))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self {
            bucket,
            distribution_id,
            region,
            build_dir,
        })
    }

    /// Replace the build directory (command line flag)
    pub fn with_build_dir(mut self, build_dir: PathBuf) -> Self {
        self.build_dir = build_dir;
        self
    }

    /// Public endpoint of the bucket
    pub fn public_url(&self) -> String {
        format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region)
    }
}

/// Build directory from the environment over `file`, without needing a bucket
pub fn build_dir_from_env(file: &FileConfig) -> PathBuf {
    resolve_build_dir(file, |name| std::env::var(name).ok())
}

/// `SITE_DEPLOY_BUILD_DIR`, then the file's `build_dir`, then `dist`
pub fn resolve_build_dir<F>(file: &FileConfig, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup(BUILD_DIR_VAR))
        .map(PathBuf::from)
        .or_else(|| file.build_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a settings file from a path
pub fn parse_deploy_toml<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let content = fs::read_to_string(path)?;
    parse_deploy_toml_str(&content)
}

/// Parse a settings file from a string (useful for testing)
pub fn parse_deploy_toml_str(content: &str) -> Result<FileConfig> {
    Ok(toml::from_str(content)?)
}

/// Load `explicit` if given, otherwise the default file when present.
///
/// A missing default file is not an error; a missing explicit one is.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Configuration(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            parse_deploy_toml(path)
        }
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                parse_deploy_toml(path)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}
