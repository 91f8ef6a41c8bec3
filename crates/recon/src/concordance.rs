//! Concordance store: alternate UUID → set of legacy UUIDs.
//!
//! The store starts empty and unloaded. `load()` fetches the feed, builds
//! the next index off to the side and publishes it with a single atomic
//! swap, so readers either see no index (and get [`NotLoadedError`]) or a
//! complete one. Reads never lock. Loads are serialised and additive: the
//! next index starts from the currently published one, which makes
//! repeated loads of the same feed idempotent.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FetchError, LoadError, NotLoadedError};
use crate::hasher::{to_alternate_uuid, to_legacy_uuid};

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// Source of the raw concordance payload (a JSON array).
pub trait ConcordanceFeed: Send + Sync {
    fn fetch_feed(&self) -> Result<String, FetchError>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String {
        "concordance feed".to_string()
    }
}

impl<F> ConcordanceFeed for F
where
    F: Fn() -> Result<String, FetchError> + Send + Sync,
{
    fn fetch_feed(&self) -> Result<String, FetchError> {
        self()
    }
}

/// Which historical feed shape is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSchema {
    /// `{"tmeid", "v2uuid"}`: alternate side is already a UUID.
    #[default]
    Tme,
    /// `{"uuid", "tmeId", "factsetId"}`: both sides are hashed.
    Factset,
}

impl std::fmt::Display for FeedSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tme => write!(f, "tme"),
            Self::Factset => write!(f, "factset"),
        }
    }
}

impl std::str::FromStr for FeedSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tme" => Ok(Self::Tme),
            "factset" => Ok(Self::Factset),
            other => Err(format!(
                "unknown concordance schema \"{other}\" (expected \"tme\" or \"factset\")"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A legacy UUID plus the raw identifier it was hashed from, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyMember {
    pub uuid: Uuid,
    pub raw_id: Option<String>,
}

/// One feed entry after hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcordancePair {
    pub alternate: Uuid,
    pub legacy: Vec<LegacyMember>,
}

/// A historical feed entry shape. `None` marks an incomplete entry.
pub trait RawConcordanceEntry {
    fn into_pair(self) -> Option<ConcordancePair>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmeConcordance {
    #[serde(default)]
    pub tmeid: String,
    #[serde(default)]
    pub v2uuid: String,
}

impl RawConcordanceEntry for TmeConcordance {
    fn into_pair(self) -> Option<ConcordancePair> {
        // Blank cells are incomplete; non-blank ids are hashed verbatim.
        let tme_id = self.tmeid.as_str();
        let v2uuid = self.v2uuid.trim();
        if tme_id.trim().is_empty() || v2uuid.is_empty() {
            return None;
        }
        let alternate = match Uuid::parse_str(v2uuid) {
            Ok(u) => u,
            Err(e) => {
                log::debug!("skipping concordance with bad v2uuid {v2uuid:?}: {e}");
                return None;
            }
        };
        Some(ConcordancePair {
            alternate,
            legacy: vec![LegacyMember {
                uuid: to_legacy_uuid(tme_id),
                raw_id: Some(tme_id.to_string()),
            }],
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactsetConcordance {
    /// Composite pipeline UUID. Optional; recorded as a legacy member.
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub tme_id: String,
    #[serde(default)]
    pub factset_id: String,
}

impl RawConcordanceEntry for FactsetConcordance {
    fn into_pair(self) -> Option<ConcordancePair> {
        let tme_id = self.tme_id.as_str();
        let factset_id = self.factset_id.as_str();
        if tme_id.trim().is_empty() || factset_id.trim().is_empty() {
            return None;
        }

        let mut legacy = vec![LegacyMember {
            uuid: to_legacy_uuid(tme_id),
            raw_id: Some(tme_id.to_string()),
        }];
        let composite = self.uuid.trim();
        if !composite.is_empty() {
            match Uuid::parse_str(composite) {
                Ok(u) => legacy.push(LegacyMember { uuid: u, raw_id: None }),
                Err(e) => log::debug!("ignoring bad composite uuid {composite:?}: {e}"),
            }
        }

        Some(ConcordancePair {
            alternate: to_alternate_uuid(factset_id),
            legacy,
        })
    }
}

fn decode_entries<E>(body: &str) -> Result<Vec<Option<ConcordancePair>>, LoadError>
where
    E: RawConcordanceEntry + DeserializeOwned,
{
    let entries: Vec<E> =
        serde_json::from_str(body).map_err(|e| LoadError::Malformed(e.to_string()))?;
    Ok(entries.into_iter().map(RawConcordanceEntry::into_pair).collect())
}

/// Decode a feed payload per schema. Incomplete entries come back as `None`.
pub fn decode_feed(schema: FeedSchema, body: &str) -> Result<Vec<Option<ConcordancePair>>, LoadError> {
    match schema {
        FeedSchema::Tme => decode_entries::<TmeConcordance>(body),
        FeedSchema::Factset => decode_entries::<FactsetConcordance>(body),
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConcordanceIndex {
    alternate_to_legacy: BTreeMap<Uuid, BTreeSet<Uuid>>,
    #[serde(skip)]
    legacy_raw_ids: BTreeMap<Uuid, String>,
}

impl ConcordanceIndex {
    /// Set-union insert. Membership only ever grows.
    pub fn insert(&mut self, pair: ConcordancePair) {
        let set = self.alternate_to_legacy.entry(pair.alternate).or_default();
        for member in pair.legacy {
            set.insert(member.uuid);
            if let Some(raw) = member.raw_id {
                self.legacy_raw_ids.insert(member.uuid, raw);
            }
        }
    }

    pub fn get(&self, alternate: &Uuid) -> Option<&BTreeSet<Uuid>> {
        self.alternate_to_legacy.get(alternate)
    }

    pub fn alternates(&self) -> impl Iterator<Item = &Uuid> {
        self.alternate_to_legacy.keys()
    }

    pub fn raw_legacy_id(&self, legacy: &Uuid) -> Option<&str> {
        self.legacy_raw_ids.get(legacy).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.alternate_to_legacy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternate_to_legacy.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Entries hashed and inserted.
    pub accepted: usize,
    /// Incomplete entries dropped by the data-quality filter.
    pub skipped: usize,
    /// Alternate UUIDs in the published index.
    pub keys: usize,
}

/// Result of a lookup. `found == false` means the key is unknown;
/// `found == true` with an empty set means known but unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookup {
    pub found: bool,
    pub legacy: BTreeSet<Uuid>,
}

pub struct ConcordanceStore {
    feed: Box<dyn ConcordanceFeed>,
    schema: FeedSchema,
    published: ArcSwapOption<ConcordanceIndex>,
    load_lock: Mutex<()>,
}

impl ConcordanceStore {
    pub fn new(feed: impl ConcordanceFeed + 'static, schema: FeedSchema) -> Self {
        Self {
            feed: Box::new(feed),
            schema,
            published: ArcSwapOption::empty(),
            load_lock: Mutex::new(()),
        }
    }

    pub fn schema(&self) -> FeedSchema {
        self.schema
    }

    /// Fetch, decode and publish. On error nothing is published.
    pub fn load(&self) -> Result<LoadStats, LoadError> {
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);

        log::debug!("loading concordances from {}", self.feed.describe());
        let body = self.feed.fetch_feed()?;
        let pairs = decode_feed(self.schema, &body)?;

        let mut next = self
            .published
            .load_full()
            .map(|current| (*current).clone())
            .unwrap_or_default();

        let mut stats = LoadStats::default();
        for pair in pairs {
            match pair {
                Some(pair) => {
                    next.insert(pair);
                    stats.accepted += 1;
                }
                None => stats.skipped += 1,
            }
        }
        stats.keys = next.len();

        self.published.store(Some(Arc::new(next)));
        log::info!(
            "Finished loading concordances: {} values ({} incomplete skipped, {} organisations)",
            stats.accepted,
            stats.skipped,
            stats.keys,
        );
        Ok(stats)
    }

    pub fn is_loaded(&self) -> bool {
        self.published.load().is_some()
    }

    /// The published index.
    pub fn snapshot(&self) -> Result<Arc<ConcordanceIndex>, NotLoadedError> {
        self.published.load_full().ok_or(NotLoadedError)
    }

    pub fn lookup_legacy_uuids(&self, alternate: &Uuid) -> Result<Lookup, NotLoadedError> {
        let index = self.snapshot()?;
        Ok(match index.get(alternate) {
            Some(set) => Lookup {
                found: true,
                legacy: set.clone(),
            },
            None => Lookup::default(),
        })
    }

    pub fn all_alternate_uuids(&self) -> Result<BTreeSet<Uuid>, NotLoadedError> {
        Ok(self.snapshot()?.alternates().copied().collect())
    }

    /// Raw identifier a legacy UUID was hashed from, if the feed carried it.
    pub fn raw_legacy_id(&self, legacy: &Uuid) -> Option<String> {
        let index = self.published.load_full()?;
        index.raw_legacy_id(legacy).map(str::to_string)
    }
}
