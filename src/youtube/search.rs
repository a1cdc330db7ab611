use super::{SearchPage, VideoSearch};
use crate::config::YouTubeConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// YouTube Data API v3 search client
pub struct YouTubeSearchClient {
    config: YouTubeConfig,
    client: reqwest::Client,
}

impl YouTubeSearchClient {
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearchClient {
    async fn search_page(
        &self,
        query: &str,
        page_size: u32,
        published_after: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let mut url = format!(
            "{}/search?part=id,snippet&type=video&q={}&maxResults={}&publishedAfter={}&key={}",
            self.config.api_base,
            urlencoding::encode(query),
            page_size,
            urlencoding::encode(published_after),
            self.config.api_key,
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", token));
        }

        debug!("Requesting search page for '{}' (size {})", query, page_size);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("search API error {}: {}", status, text));
        }

        let page: SearchPage = response.json().await?;
        Ok(page)
    }
}
