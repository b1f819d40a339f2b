//! Downloading external images.
//!
//! [`FetchingResolver`] wraps a store and answers `fetch` for `http(s)`
//! image references through an [`ImageFetcher`]. A download that fails or
//! does not look like an image resolves to `None`, so exports carry on
//! without it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;

use crate::domain::{ImagePayload, sniff_mime};
use crate::infra::ImageResolver;

/// Default timeout for one image download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors from downloading an image.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unsupported image URL: {0}")]
    UnsupportedUrl(String),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{0} did not return an image")]
    NotImage(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Downloads raw bytes from a URL.
pub trait ImageFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Builds a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the TLS backend cannot be set up.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cornell/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().map_err(request_error)?;
        Ok(bytes.to_vec())
    }
}

/// A resolver that also downloads external images.
///
/// Store ids go to the wrapped resolver. Each URL is downloaded at most
/// once per resolver; failures are remembered too.
pub struct FetchingResolver<R, F> {
    inner: R,
    fetcher: F,
    fetched: RefCell<HashMap<String, Option<ImagePayload>>>,
}

impl<R: ImageResolver, F: ImageFetcher> FetchingResolver<R, F> {
    pub fn new(inner: R, fetcher: F) -> Self {
        Self {
            inner,
            fetcher,
            fetched: RefCell::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn download(&self, url: &str) -> Result<ImagePayload, FetchError> {
        let target = normalize_url(url)?;
        let bytes = self.fetcher.get(&target)?;
        if sniff_mime(&bytes).is_none() {
            return Err(FetchError::NotImage(target));
        }
        debug!("fetched {} bytes from {}", bytes.len(), target);
        Ok(ImagePayload::from_bytes(bytes))
    }
}

impl<R: ImageResolver, F: ImageFetcher> ImageResolver for FetchingResolver<R, F> {
    fn resolve(&self, id: &str) -> Option<ImagePayload> {
        self.inner.resolve(id)
    }

    fn fetch(&self, url: &str) -> Option<ImagePayload> {
        if let Some(cached) = self.fetched.borrow().get(url) {
            return cached.clone();
        }

        let payload = match self.download(url) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("cannot fetch image: {}", e);
                None
            }
        };
        self.fetched
            .borrow_mut()
            .insert(url.to_string(), payload.clone());
        payload
    }
}

/// Protocol-relative URLs are fetched over https; other schemes are refused.
fn normalize_url(url: &str) -> Result<String, FetchError> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(url.to_string())
    } else if url.starts_with("//") {
        Ok(format!("https:{url}"))
    } else {
        Err(FetchError::UnsupportedUrl(url.to_string()))
    }
}
