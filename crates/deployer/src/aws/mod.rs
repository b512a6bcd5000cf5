// S3 and CloudFront backend

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_s3::primitives::ByteStream;
use site_deploy_core::{FileEntry, InvalidationRequest};

use crate::SiteBackend;

/// AWS clients sharing one region and credential chain
pub struct AwsBackend {
    s3: aws_sdk_s3::Client,
    cloudfront: aws_sdk_cloudfront::Client,
}

impl AwsBackend {
    /// Load credentials from the default provider chain for `region`
    pub async fn new(region: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        tracing::debug!(region, "AWS clients configured");

        Self {
            s3: aws_sdk_s3::Client::new(&sdk_config),
            cloudfront: aws_sdk_cloudfront::Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl SiteBackend for AwsBackend {
    async fn check_bucket(&self, bucket: &str) -> Result<()> {
        self.s3
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", aws_sdk_s3::error::DisplayErrorContext(&e)))?;
        Ok(())
    }

    /// Single-request `PutObject`, so each file is limited to 5 GB. There is
    /// no multipart fallback for larger files.
    async fn put_object(&self, bucket: &str, entry: &FileEntry) -> Result<()> {
        let body = ByteStream::from_path(&entry.source)
            .await
            .with_context(|| format!("Failed to read {}", entry.source.display()))?;

        self.s3
            .put_object()
            .bucket(bucket)
            .key(&entry.key)
            .body(body)
            .content_type(entry.content_type)
            .cache_control(entry.cache_policy.header_value())
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", aws_sdk_s3::error::DisplayErrorContext(&e)))
            .with_context(|| format!("Failed to upload {}", entry.key))?;
        Ok(())
    }

    async fn create_invalidation(&self, request: &InvalidationRequest) -> Result<String> {
        let quantity = i32::try_from(request.paths.len()).context("Too many invalidation paths")?;
        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(request.paths.clone()))
            .build()
            .context("Invalid invalidation paths")?;
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(&request.caller_reference)
            .build()
            .context("Invalid invalidation batch")?;

        let response = self
            .cloudfront
            .create_invalidation()
            .distribution_id(&request.distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!("{}", aws_sdk_cloudfront::error::DisplayErrorContext(&e))
            })?;

        let invalidation = response
            .invalidation()
            .context("No invalidation returned from API")?;
        Ok(invalidation.id().to_string())
    }
}
