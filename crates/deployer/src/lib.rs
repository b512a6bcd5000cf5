// Publishing a build directory to S3 and invalidating CloudFront

pub mod aws;
pub mod pipeline;
pub mod walk;

pub use aws::AwsBackend;
pub use pipeline::{DeployError, DeploySummary, Deployer};
pub use walk::plan;

use async_trait::async_trait;
use site_deploy_core::{FileEntry, InvalidationRequest};

/// The remote calls a deploy needs.
///
/// Kept narrow so tests can swap in an in-memory fake.
#[async_trait]
pub trait SiteBackend: Send + Sync {
    /// Fail unless `bucket` exists and the current credentials can reach it
    async fn check_bucket(&self, bucket: &str) -> anyhow::Result<()>;

    /// Upload one file with its content type and cache-control metadata
    async fn put_object(&self, bucket: &str, entry: &FileEntry) -> anyhow::Result<()>;

    /// Submit a cache invalidation, returning its id once accepted
    async fn create_invalidation(&self, request: &InvalidationRequest) -> anyhow::Result<String>;
}
