//! Image download over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use reqwest::StatusCode;
use tracing::debug;

use super::{FetchError, ImageSource};
use crate::error::SlideError;

pub const USER_AGENT: &str = concat!("slidegen/", env!("CARGO_PKG_VERSION"));

/// Default bound on a single download, connect through body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on a downloaded body.
pub const DEFAULT_MAX_BYTES: usize = 32 * 1024 * 1024;

/// [`ImageSource`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageSource {
    /// Client with the crate user agent and a total request timeout.
    pub fn new(timeout: Duration) -> Result<Self, SlideError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SlideError::Transport(format!("HTTP client error: {}", e)))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    /// Refuse bodies larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// GET `url` and return the body of a successful response.
    ///
    /// The body is read chunk by chunk and abandoned as soon as it passes
    /// the size limit, whether or not the server announced its length.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        let too_large = FetchError::TooLarge {
            limit: self.max_bytes,
        };
        if let Some(length) = response.content_length()
            && length > self.max_bytes as u64
        {
            return Err(too_large);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(too_large);
            }
            body.extend_from_slice(&chunk);
        }
        debug!(url, bytes = body.len(), "downloaded");
        Ok(body)
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch_image(&self, url: &str) -> Result<DynamicImage, FetchError> {
        let bytes = self.fetch_bytes(url).await?;
        decode(&bytes)
    }
}

/// Decode an in-memory raster of any format the image crate knows.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, FetchError> {
    image::load_from_memory(bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

fn status_error(status: StatusCode) -> FetchError {
    if status == StatusCode::NOT_FOUND {
        FetchError::NotFound
    } else {
        FetchError::Http(status.as_u16())
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}
