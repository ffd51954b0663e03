use super::types::DownloadRequest;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Human-readable name of the downloader
    fn name(&self) -> &'static str;

    /// Fetch the request into its download directory and return the
    /// downloader's exit code unchanged.
    async fn download(&self, request: &DownloadRequest) -> Result<i32>;
}
