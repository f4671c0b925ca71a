use crate::error::{Result, ScoutError};
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::RequestProfile;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Plain HTTP client for the SAGA listing and detail pages
pub struct SagaClient {
    client: Client,
}

impl SagaClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_profile(&RequestProfile::default(), timeout)
    }

    pub fn with_profile(profile: &RequestProfile, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&profile.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&profile.accept_language)?);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(profile.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ScoutError::Config(format!("invalid header value {:?}: {}", value, e)))
}

#[async_trait]
impl PageFetcher for SagaClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            warn!("{} returned status: {}", url, response.status());
            return Err(ScoutError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }
}
