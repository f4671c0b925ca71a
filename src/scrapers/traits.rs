use crate::error::Result;
use async_trait::async_trait;

/// Fetches the HTML body of a page.
/// Anything other than a successful response is an error for the caller to skip.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}
