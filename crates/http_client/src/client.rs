use std::thread;
use std::time::Duration;

use orgrecon_core::wire::decode_organisation;
use orgrecon_core::{CombinedOrganisation, ConcordanceFeed, FetchError, RecordFetcher};
use thiserror::Error;

pub const USER_AGENT: &str = concat!("orgrecon/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a server-supplied `Retry-After` and on the backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

// ── Options ─────────────────────────────────────────────────────────

/// Connection and retry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// Whole-request timeout.
    pub timeout: Duration,
    pub tcp_keepalive: Duration,
    pub pool_max_idle_per_host: usize,
    /// Retries after the first attempt for 429, 5xx and network errors.
    pub max_retries: u32,
    /// First backoff delay; doubled after every retry.
    pub initial_backoff: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(30),
            pool_max_idle_per_host: 128,
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

// ── HttpClient ──────────────────────────────────────────────────────

/// Pooled blocking client with retry, backoff and error classification.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::blocking::Client,
    opts: HttpOptions,
}

impl HttpClient {
    pub fn new(opts: HttpOptions) -> Result<Self, ClientBuildError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(opts.timeout)
            .tcp_keepalive(opts.tcp_keepalive)
            .pool_max_idle_per_host(opts.pool_max_idle_per_host)
            .build()?;
        Ok(Self { http, opts })
    }

    /// GET `url` and return the body.
    ///
    /// 429, 5xx and network errors are retried with exponential backoff
    /// (429 honours `Retry-After`). Any other non-success status fails
    /// immediately.
    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut backoff = self.opts.initial_backoff;
        let mut attempt = 0u32;

        loop {
            let err = match self.http.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if resp.status().is_success() {
                        return resp
                            .text()
                            .map(|text| text.trim_start_matches('\u{feff}').to_string())
                            .map_err(|e| FetchError::Network {
                                url: url.to_string(),
                                message: format!("failed to read response body: {e}"),
                            });
                    }

                    let err = FetchError::Status {
                        url: url.to_string(),
                        status,
                    };
                    if status != 429 && status < 500 {
                        return Err(err);
                    }
                    if status == 429 {
                        if let Some(wait) = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(retry_after)
                        {
                            backoff = wait;
                        }
                    }
                    err
                }
                Err(e) => FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                },
            };

            if attempt >= self.opts.max_retries {
                log::debug!("giving up on {url} after {} attempts", attempt + 1);
                return Err(err);
            }
            attempt += 1;
            log::warn!(
                "retry {}/{} in {:?} ({err})",
                attempt,
                self.opts.max_retries,
                backoff,
            );
            thread::sleep(backoff);
            backoff = next_backoff(backoff);
        }
    }
}

/// Delay-seconds form of `Retry-After`, capped at [`MAX_BACKOFF`].
fn retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_BACKOFF))
}

fn next_backoff(current: Duration) -> Duration {
    current.saturating_mul(2).min(MAX_BACKOFF)
}

impl RecordFetcher for HttpClient {
    fn fetch(&self, url: &str) -> Result<CombinedOrganisation, FetchError> {
        log::debug!("fetching {url}");
        let body = self.get_text(url)?;
        decode_organisation(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

// ── FeedClient ──────────────────────────────────────────────────────

/// The concordance feed at a fixed URL.
pub struct FeedClient {
    http: HttpClient,
    url: String,
}

impl FeedClient {
    pub fn new(http: HttpClient, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ConcordanceFeed for FeedClient {
    fn fetch_feed(&self) -> Result<String, FetchError> {
        self.http.get_text(&self.url)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = HttpOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(30));
        assert_eq!(opts.tcp_keepalive, Duration::from_secs(30));
        assert_eq!(opts.pool_max_idle_per_host, 128);
        assert_eq!(opts.max_retries, 3);
    }

    #[test]
    fn retry_after_is_capped() {
        assert_eq!(retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(retry_after("86400"), Some(MAX_BACKOFF));
        assert_eq!(retry_after(&u64::MAX.to_string()), Some(MAX_BACKOFF));
        assert_eq!(retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        assert_eq!(next_backoff(Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(next_backoff(Duration::from_secs(200)), MAX_BACKOFF);
        assert_eq!(next_backoff(Duration::MAX), MAX_BACKOFF);
    }

    #[test]
    fn feed_client_describes_its_url() {
        let http = HttpClient::new(HttpOptions::default()).unwrap();
        let feed = FeedClient::new(http, "http://feed.example/orgs");
        assert_eq!(feed.describe(), "http://feed.example/orgs");
        assert_eq!(feed.url(), "http://feed.example/orgs");
    }
}
