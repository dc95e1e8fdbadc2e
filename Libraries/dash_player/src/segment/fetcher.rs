use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{redirect, Client};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

use crate::mpd::{parser::parse_mpd, Mpd};
use crate::DashError;

/// Something that can hand out the bytes behind a URL.
#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Downloads the whole resource. A single attempt, failures are returned as is.
    async fn fetch(&self, url: &Url) -> Result<Bytes, DashError>;

    /// Downloads and parses a manifest.
    async fn fetch_manifest(&self, url: &Url) -> Result<Mpd, DashError> {
        let data = self.fetch(url).await?;
        let text = std::str::from_utf8(&data)
            .map_err(|e| DashError::manifest(format!("manifest at {} is not valid UTF-8: {}", url, e)))?;
        parse_mpd(text)
    }
}

/// [`SegmentSource`] over HTTP(S).
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Redirects are not followed, a 3xx answer is a [`DashError::Transport`].
    pub fn new(timeout: Duration) -> Result<Self, DashError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(DashError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SegmentSource for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes, DashError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DashError::Connection { url: url.to_string(), source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashError::Transport {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DashError::Connection { url: url.to_string(), source: e })?;

        let duration_secs = start.elapsed().as_secs_f64();
        debug!(
            "Downloaded {} bytes from {} in {:.3}s ({:.0} bps)",
            bytes.len(),
            url,
            duration_secs,
            (bytes.len() as f64 * 8.0) / duration_secs.max(f64::EPSILON)
        );

        Ok(bytes)
    }
}
