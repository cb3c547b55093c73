use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{GutendexError, Result};

/// Thin JSON-over-HTTP client. One attempt per call, no retries.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub async fn get(&self, url: &Url) -> Result<String> {
        debug!(%url, "GET");
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GutendexError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let text = self.get(url).await?;
        serde_json::from_str(&text).map_err(|e| GutendexError::Parse(e.to_string()))
    }
}
