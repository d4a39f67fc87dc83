//! Out-of-band image checks.
//!
//! A card image being visible says nothing about whether its `src` actually
//! resolves, so the image is fetched again over plain HTTP and must answer
//! `200 OK`.

use crate::result::{ProbeError, ProbeResult};
use reqwest::Url;
use std::time::Duration;

/// HTTP client for image resource checks
#[derive(Debug, Clone)]
pub struct ImageProbe {
    client: reqwest::Client,
}

impl Default for ImageProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ImageProbe {
    /// Create a probe with a request timeout
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Create a probe with a custom reqwest client
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Resolve an image `src` against the URL of the page it appeared on.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidUrl`] if either URL is malformed
    pub fn resolve(page_url: &str, src: &str) -> ProbeResult<Url> {
        let base = Url::parse(page_url).map_err(|e| ProbeError::InvalidUrl {
            url: page_url.to_string(),
            message: e.to_string(),
        })?;
        base.join(src).map_err(|e| ProbeError::InvalidUrl {
            url: src.to_string(),
            message: e.to_string(),
        })
    }

    /// GET the image and require exactly status 200.
    ///
    /// Returns the resolved URL on success.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ImageStatus`] for any other status and
    /// [`ProbeError::ImageRequest`] if the request could not complete
    pub async fn check(&self, page_url: &str, src: &str) -> ProbeResult<Url> {
        let url = Self::resolve(page_url, src)?;
        tracing::debug!(%url, "fetching card image");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProbeError::ImageRequest {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(ProbeError::ImageStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(url)
    }
}
