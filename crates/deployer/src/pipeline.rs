use anyhow::{Context, Result};
use site_deploy_core::{DeployConfig, InvalidationRequest, Stage};
use std::fmt;

use crate::SiteBackend;
use crate::walk::plan;

/// Outcome of a successful deploy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub files_uploaded: usize,
    /// `None` when no distribution is configured
    pub invalidation_id: Option<String>,
    pub site_url: String,
}

/// A deploy that stopped at `stage`
#[derive(Debug)]
pub struct DeployError {
    pub stage: Stage,
    pub source: anyhow::Error,
}

impl DeployError {
    fn new(stage: Stage, source: anyhow::Error) -> Self {
        Self { stage, source }
    }
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deploy failed at {} stage: {:#}", self.stage, self.source)
    }
}

impl std::error::Error for DeployError {}

/// Runs validate, upload and invalidate in order, stopping at the first failure.
///
/// Nothing is rolled back: files uploaded before a failure stay uploaded.
pub struct Deployer<B> {
    config: DeployConfig,
    backend: B,
}

impl<B: SiteBackend> Deployer<B> {
    pub fn new(config: DeployConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn deploy(&self) -> std::result::Result<DeploySummary, DeployError> {
        println!(
            "🚀 Deploying {} to s3://{}",
            self.config.build_dir.display(),
            self.config.bucket
        );
        println!("{}", "-".repeat(50));

        self.validate().await?;
        let files_uploaded = self.upload_all().await?;
        let invalidation_id = self.invalidate_cache().await?;

        let site_url = self.config.public_url();
        println!("{}", "-".repeat(50));
        println!("🎉 Deployment complete!");
        println!("   Site URL: {}", site_url);

        Ok(DeploySummary {
            files_uploaded,
            invalidation_id,
            site_url,
        })
    }

    /// Check the build directory, then probe the bucket
    pub async fn validate(&self) -> std::result::Result<(), DeployError> {
        let build_dir = &self.config.build_dir;
        if !build_dir.is_dir() {
            println!("❌ Build directory not found: {}", build_dir.display());
            return Err(DeployError::new(
                Stage::Validate,
                anyhow::anyhow!("build directory not found: {}", build_dir.display()),
            ));
        }

        match self.backend.check_bucket(&self.config.bucket).await {
            Ok(()) => {
                println!("✅ Bucket reachable: {}", self.config.bucket);
                Ok(())
            }
            Err(e) => {
                println!("❌ Bucket not reachable: {:#}", e);
                Err(DeployError::new(
                    Stage::Validate,
                    e.context(format!("bucket {} is not reachable", self.config.bucket)),
                ))
            }
        }
    }

    /// Upload every file of the build directory, returning how many were sent
    pub async fn upload_all(&self) -> std::result::Result<usize, DeployError> {
        println!("📤 Uploading files to S3...");

        match self.upload_files().await {
            Ok(count) => {
                println!("✅ Uploaded {} files", count);
                Ok(count)
            }
            Err(e) => {
                println!("❌ Upload failed: {:#}", e);
                Err(DeployError::new(Stage::Upload, e))
            }
        }
    }

    async fn upload_files(&self) -> Result<usize> {
        let entries = plan(&self.config.build_dir)?;

        let mut uploaded = 0;
        for entry in &entries {
            tracing::debug!(
                key = %entry.key,
                content_type = entry.content_type,
                cache_control = entry.cache_policy.header_value(),
                "uploading"
            );
            self.backend
                .put_object(&self.config.bucket, entry)
                .await
                .with_context(|| {
                    format!("{} ({} of {})", entry.key, uploaded + 1, entries.len())
                })?;
            uploaded += 1;
        }

        tracing::info!(uploaded, bucket = %self.config.bucket, "upload finished");
        Ok(uploaded)
    }

    /// Invalidate every cached path of the distribution, if one is configured
    pub async fn invalidate_cache(&self) -> std::result::Result<Option<String>, DeployError> {
        let Some(distribution_id) = &self.config.distribution_id else {
            println!("⚠️  No CloudFront distribution configured, skipping cache invalidation");
            return Ok(None);
        };

        println!("🔄 Invalidating CloudFront cache...");
        let request = InvalidationRequest::new(distribution_id.as_str());
        tracing::debug!(
            distribution_id = %request.distribution_id,
            caller_reference = %request.caller_reference,
            "creating invalidation"
        );

        match self.backend.create_invalidation(&request).await {
            Ok(id) => {
                println!("✅ Invalidation submitted: {}", id);
                Ok(Some(id))
            }
            Err(e) => {
                println!("❌ Cache invalidation failed: {:#}", e);
                Err(DeployError::new(Stage::Invalidate, e))
            }
        }
    }
}
