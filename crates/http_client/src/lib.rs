//! Blocking HTTP collaborators for orgrecon.
//!
//! One pooled reqwest client serves both the record endpoints
//! ([`RecordFetcher`](orgrecon_core::RecordFetcher)) and the concordance
//! feed ([`ConcordanceFeed`](orgrecon_core::ConcordanceFeed)). No Tokio
//! runtime required.

mod client;

pub use client::{ClientBuildError, FeedClient, HttpClient, HttpOptions, MAX_BACKOFF, USER_AGENT};
