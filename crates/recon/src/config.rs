use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Engine config
// ---------------------------------------------------------------------------

/// What the reconciliation engine needs to know about the two pipelines.
///
/// Record URLs are built by appending the UUID to the base URL verbatim, so
/// base URLs normally end in `/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub composite_base_url: String,
    pub factset_base_url: String,
    #[serde(default)]
    pub array_mode: ArrayMode,
}

impl ReconConfig {
    pub fn new(composite_base_url: impl Into<String>, factset_base_url: impl Into<String>) -> Self {
        Self {
            composite_base_url: composite_base_url.into(),
            factset_base_url: factset_base_url.into(),
            array_mode: ArrayMode::default(),
        }
    }

    pub fn with_array_mode(mut self, mode: ArrayMode) -> Self {
        self.array_mode = mode;
        self
    }

    pub fn composite_url(&self, uuid: &uuid::Uuid) -> String {
        format!("{}{}", self.composite_base_url, uuid)
    }

    pub fn factset_url(&self, uuid: &uuid::Uuid) -> String {
        format!("{}{}", self.factset_base_url, uuid)
    }
}

// ---------------------------------------------------------------------------
// Array comparison
// ---------------------------------------------------------------------------

/// How two present name arrays are compared.
///
/// `Containment` is the long-standing check: equal length, and every
/// composite element appears somewhere in the factset array. It accepts
/// `["a", "a", "b"]` vs `["a", "b", "b"]`. `Multiset` additionally requires
/// equal multiplicities and is opt-in because it reports more mismatches
/// than historical runs did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayMode {
    #[default]
    Containment,
    Multiset,
}

impl std::fmt::Display for ArrayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Containment => write!(f, "containment"),
            Self::Multiset => write!(f, "multiset"),
        }
    }
}

impl std::str::FromStr for ArrayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "containment" => Ok(Self::Containment),
            "multiset" => Ok(Self::Multiset),
            other => Err(format!(
                "unknown array mode \"{other}\" (expected \"containment\" or \"multiset\")"
            )),
        }
    }
}
