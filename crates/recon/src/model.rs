use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::concordance::FeedSchema;
use crate::config::ArrayMode;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

pub const UPP_AUTHORITY: &str = "http://api.ft.com/system/FT-UPP";
pub const TME_AUTHORITY: &str = "http://api.ft.com/system/FT-TME";
pub const FACTSET_AUTHORITY: &str = "http://api.ft.com/system/FACTSET";
pub const LEI_AUTHORITY: &str = "http://api.ft.com/system/LEI";

/// Issuer of an alternative identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    /// Platform UUIDs (legacy and alternate alike).
    Upp,
    Tme,
    Factset,
    Lei,
    /// Any authority URI not listed above, kept verbatim.
    Other(String),
}

impl Authority {
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            UPP_AUTHORITY => Self::Upp,
            TME_AUTHORITY => Self::Tme,
            FACTSET_AUTHORITY => Self::Factset,
            LEI_AUTHORITY => Self::Lei,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            Self::Upp => UPP_AUTHORITY,
            Self::Tme => TME_AUTHORITY,
            Self::Factset => FACTSET_AUTHORITY,
            Self::Lei => LEI_AUTHORITY,
            Self::Other(uri) => uri,
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub authority: Authority,
    pub value: String,
}

impl Identifier {
    pub fn new(authority: Authority, value: impl Into<String>) -> Self {
        Self {
            authority,
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// An organisation record from either pipeline, after identifier
/// normalisation (see [`crate::wire`]).
///
/// Array fields keep the absent/present distinction: `None` and
/// `Some(vec![])` are different values and compare as a mismatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombinedOrganisation {
    pub uuid: String,
    pub kind: String,
    pub proper_name: String,
    pub pref_label: String,
    pub legal_name: String,
    pub short_name: String,
    pub hidden_label: String,
    pub industry_classification: String,
    pub parent_organisation: String,
    pub trade_names: Option<Vec<String>>,
    pub local_names: Option<Vec<String>>,
    pub former_names: Option<Vec<String>>,
    pub aliases: Option<Vec<String>>,
    pub identifiers: Vec<Identifier>,
}

impl CombinedOrganisation {
    /// Does this record claim `value` under `authority`?
    pub fn claims(&self, authority: &Authority, value: &str) -> bool {
        self.identifiers
            .iter()
            .any(|id| &id.authority == authority && id.value == value)
    }

    /// UPP identifiers that parse as UUIDs. Unparseable values are ignored.
    pub fn upp_uuids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.identifiers
            .iter()
            .filter(|id| id.authority == Authority::Upp)
            .filter_map(|id| Uuid::parse_str(id.value.trim()).ok())
    }
}

// ---------------------------------------------------------------------------
// Discrepancies
// ---------------------------------------------------------------------------

/// Compared field. `as_str` names are the report keys used by earlier runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Field {
    Type,
    ProperName,
    PrefLabel,
    LegalName,
    ShortName,
    HiddenLabel,
    IndustryClassification,
    ParentOrganisation,
    TradeNames,
    LocalNames,
    FormerNames,
    Aliases,
    Identifiers,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::ProperName => "ProperName",
            Self::PrefLabel => "PrefLabel",
            Self::LegalName => "LegalName",
            Self::ShortName => "ShortName",
            Self::HiddenLabel => "HiddenLabel",
            Self::IndustryClassification => "IndustryClassification",
            Self::ParentOrganisation => "ParentOrganisation",
            Self::TradeNames => "TradeNames",
            Self::LocalNames => "LocalNames",
            Self::FormerNames => "FormerNames",
            Self::Aliases => "Aliases",
            Self::Identifiers => "Identifiers",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Composite,
    Factset,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite => write!(f, "composite"),
            Self::Factset => write!(f, "factset"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Concordance lookup attempted before the store was loaded.
    NotLoaded,
    /// One of the two records could not be fetched; nothing was compared.
    FetchFailed {
        source: RecordSource,
        url: String,
        message: String,
    },
    ValueMismatch {
        composite: String,
        factset: String,
    },
    /// One side has the array, the other does not.
    ArrayPresence {
        composite: Option<Vec<String>>,
        factset: Option<Vec<String>>,
    },
    ArrayLength {
        composite: Vec<String>,
        factset: Vec<String>,
    },
    ArrayContent {
        composite: Vec<String>,
        factset: Vec<String>,
    },
    /// An expected UUID is not among the composite record's UPP identifiers.
    MissingIdentifier {
        uuid: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        raw_legacy_id: Option<String>,
    },
    /// Nothing to expect: no concordance for this organisation.
    NoConcordedUuids { uuid: String },
}

/// One failing check for one entity. `field` is `None` for entity-level
/// failures (not loaded, fetch failed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub entity: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(flatten)]
    pub kind: DiscrepancyKind,
}

impl Discrepancy {
    pub fn entity_level(entity: Uuid, kind: DiscrepancyKind) -> Self {
        Self {
            entity,
            field: None,
            kind,
        }
    }

    pub fn field(entity: Uuid, field: Field, kind: DiscrepancyKind) -> Self {
        Self {
            entity,
            field: Some(field),
            kind,
        }
    }

    pub fn is_entity_level(&self) -> bool {
        self.field.is_none()
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {}: ", self.entity, field)?,
            None => write!(f, "[{}] ", self.entity)?,
        }
        match &self.kind {
            DiscrepancyKind::NotLoaded => write!(f, "concordance not loaded yet"),
            DiscrepancyKind::FetchFailed {
                source,
                url,
                message,
            } => write!(f, "could not fetch {source} record from {url}: {message}"),
            DiscrepancyKind::ValueMismatch { composite, factset } => write!(
                f,
                "not identical - composite: {composite:?}, factset: {factset:?}"
            ),
            DiscrepancyKind::ArrayPresence { composite, factset } => write!(
                f,
                "one of the field arrays is absent - composite: {composite:?}, factset: {factset:?}"
            ),
            DiscrepancyKind::ArrayLength { composite, factset } => write!(
                f,
                "field arrays have different sizes - composite: {composite:?}, factset: {factset:?}"
            ),
            DiscrepancyKind::ArrayContent { composite, factset } => write!(
                f,
                "not identical - composite: {composite:?}, factset: {factset:?}"
            ),
            DiscrepancyKind::MissingIdentifier {
                uuid,
                raw_legacy_id: Some(raw),
            } => write!(f, "no UPP identifier found for {uuid} (legacy id {raw})"),
            DiscrepancyKind::MissingIdentifier { uuid, .. } => {
                write!(f, "no UPP identifier found for {uuid}")
            }
            DiscrepancyKind::NoConcordedUuids { uuid } => {
                write!(f, "no concorded uuids for org {uuid}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub composite_base_url: String,
    pub factset_base_url: String,
    pub concordance_schema: FeedSchema,
    pub array_mode: ArrayMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    /// Alternate UUIDs visited.
    pub entities: usize,
    /// Entities that could not be compared at all.
    pub entities_failed: usize,
    /// Entities with at least one discrepancy (failed ones included).
    pub entities_with_discrepancies: usize,
    pub discrepancies: usize,
    /// Field name → discrepancy count. Entity-level failures are under "Entity".
    pub field_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub discrepancies: Vec<Discrepancy>,
}

impl ReconReport {
    /// True when no discrepancy of any kind was found.
    pub fn is_reconciled(&self) -> bool {
        self.discrepancies.is_empty()
    }
}
