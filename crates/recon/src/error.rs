use thiserror::Error;

/// A collaborator could not produce a payload.
///
/// Shared by the record endpoints and the concordance feed: both are plain
/// HTTP GETs returning JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, ...
    #[error("could not connect to {url}: {message}")]
    Network { url: String, message: String },
    /// Endpoint answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// Body was not the expected JSON shape.
    #[error("error decoding response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => url,
        }
    }
}

/// Concordance load failed. Retryable by the caller; the store is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("error while retrieving concordances: {0}")]
    Fetch(#[from] FetchError),
    #[error("malformed concordance payload: {0}")]
    Malformed(String),
}

/// A read was attempted before any `load()` succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("concordance not loaded yet")]
pub struct NotLoadedError;
