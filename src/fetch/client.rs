//! HTTP client for playlist and fragment downloads.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::config::FetchConfig;
use crate::error::{HarvestError, Result};

/// Something that can turn a URL into a text body.
///
/// The pipeline only ever talks to this trait, so tests can serve playlists
/// and fragments from memory.
pub trait TextFetcher: Sync {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP client wrapper. Built once per run and passed down explicitly.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Create a new client from the fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            inner: builder.build()?,
        })
    }
}

impl TextFetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.inner.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
