//! `orgrecon-core`: organisation concordance and reconciliation engine.
//!
//! Pure engine crate: the concordance feed and the record endpoints are
//! reached through the [`ConcordanceFeed`] and [`RecordFetcher`] traits.
//! No CLI or HTTP dependencies.

pub mod canonical;
pub mod compare;
pub mod concordance;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod hasher;
pub mod identifiers;
pub mod model;
pub mod wire;

pub use canonical::{canonical, canonical_for};
pub use concordance::{ConcordanceFeed, ConcordanceStore, FeedSchema, LoadStats, Lookup};
pub use config::{ArrayMode, ReconConfig};
pub use engine::{Reconciler, RecordFetcher};
pub use error::{FetchError, LoadError, NotLoadedError};
pub use hasher::{to_alternate_uuid, to_legacy_uuid};
pub use model::{
    Authority, CombinedOrganisation, Discrepancy, DiscrepancyKind, Field, Identifier,
    RecordSource, ReconReport, ReconSummary,
};
pub use wire::{OrganisationWire, RawIdentifierList};
