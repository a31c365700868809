//! HTTP fetching with exponential backoff retry logic.
//!
//! This module is the adapter-to-network boundary. Every source owns its own
//! fetcher; nothing here is shared between concurrent invocations.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`FetchText`]: Core trait defining an async GET returning the body text
//! - [`HttpFetcher`]: A single attempt through a configured `reqwest::Client`
//! - [`RetryFetch`]: Decorator that adds retry logic to any `FetchText`
//! - [`StaticContent`]: Serves a fixed body, for fixtures and offline runs
//!
//! # Retry Strategy
//!
//! Only transient failures are retried (transport errors, HTTP 429, 5xx):
//! - Exponential backoff starting at `base_delay`
//! - Maximum delay capped at 10 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::error::SourceError;
use async_trait::async_trait;
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Default client identifier sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "source_digest/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/graves/source_digest)"
);

/// Trait for fetching a URL as text.
///
/// Implementors must treat any non-2xx response as a failure rather than
/// returning its body.
#[async_trait]
pub trait FetchText: Send + Sync + fmt::Debug {
    async fn get_text(&self, url: &str) -> Result<String, SourceError>;
}

/// Settings for building an HTTP fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Per-request timeout enforced by the client.
    pub timeout: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Retries after the first attempt for transient failures.
    pub retries: usize,
    /// Initial backoff delay (doubles with each attempt).
    pub base_delay: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// One GET per call through a configured client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

/// Map a response status to success or a [`SourceError::Status`].
pub fn check_status(url: &str, status: reqwest::StatusCode) -> Result<(), SourceError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn transport(url: &str, e: reqwest::Error) -> SourceError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    SourceError::Fetch {
        url: url.to_string(),
        reason,
    }
}

#[async_trait]
impl FetchText for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let t0 = Instant::now();
        let resp = self.client.get(url).send().await.map_err(|e| transport(url, e))?;
        check_status(url, resp.status())?;
        let body = resp.text().await.map_err(|e| transport(url, e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchText`].
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: FetchText,
{
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

#[async_trait]
impl<T> FetchText for RetryFetch<T>
where
    T: FetchText,
{
    #[instrument(level = "debug", skip(self))]
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.get_text(url).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "get_text() exhausted retries"
                        );
                        return Err(e);
                    }

                    let exp = u32::try_from(attempt - 1).unwrap_or(u32::MAX).min(16);
                    let delay = self.base_delay.saturating_mul(1 << exp).min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "get_text() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Build the standard fetcher: a [`HttpFetcher`] wrapped in [`RetryFetch`].
pub fn fetcher(settings: &FetchSettings) -> Result<RetryFetch<HttpFetcher>, reqwest::Error> {
    Ok(RetryFetch::new(
        HttpFetcher::new(settings)?,
        settings.retries,
        settings.base_delay,
    ))
}

/// Serves the same body for every URL.
#[derive(Debug, Clone)]
pub struct StaticContent(pub String);

#[async_trait]
impl FetchText for StaticContent {
    async fn get_text(&self, _url: &str) -> Result<String, SourceError> {
        Ok(self.0.clone())
    }
}
