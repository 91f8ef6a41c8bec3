//! Wire shapes for organisation records and their normalisation.
//!
//! Two identifier representations have been deployed:
//!
//! - `alternativeIdentifiers`: typed arrays (`TME`, `uuids`) plus single
//!   `factsetIdentifier` / `leiCode` strings.
//! - `identifiers`: a flat list of `{authority, identifierValue}` pairs.
//!
//! Both implement [`RawIdentifierList`] and are normalised into
//! [`Identifier`] values before any comparison runs. A payload carrying both
//! gets the union.

use serde::Deserialize;

use crate::model::{Authority, CombinedOrganisation, Identifier};

/// A historical identifier representation that can be normalised.
pub trait RawIdentifierList {
    fn normalise(&self) -> Vec<Identifier>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlternativeIdentifiers {
    #[serde(rename = "TME", default)]
    pub tme: Vec<String>,
    #[serde(default)]
    pub uuids: Vec<String>,
    #[serde(rename = "factsetIdentifier", default)]
    pub factset_identifier: String,
    #[serde(rename = "leiCode", default)]
    pub lei_code: String,
}

impl RawIdentifierList for AlternativeIdentifiers {
    fn normalise(&self) -> Vec<Identifier> {
        let mut out = Vec::with_capacity(self.tme.len() + self.uuids.len() + 2);
        out.extend(self.tme.iter().map(|v| Identifier::new(Authority::Tme, v.as_str())));
        out.extend(self.uuids.iter().map(|v| Identifier::new(Authority::Upp, v.as_str())));
        if !self.factset_identifier.is_empty() {
            out.push(Identifier::new(Authority::Factset, self.factset_identifier.as_str()));
        }
        if !self.lei_code.is_empty() {
            out.push(Identifier::new(Authority::Lei, self.lei_code.as_str()));
        }
        out
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityIdentifier {
    pub authority: String,
    pub identifier_value: String,
}

impl RawIdentifierList for [AuthorityIdentifier] {
    fn normalise(&self) -> Vec<Identifier> {
        self.iter()
            .map(|id| Identifier::new(Authority::from_uri(&id.authority), id.identifier_value.as_str()))
            .collect()
    }
}

/// Organisation record as served by either transformer.
///
/// Missing scalars decode as empty strings. Missing or `null` arrays decode
/// as `None`, an empty JSON array as `Some(vec![])`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationWire {
    #[serde(default)]
    pub uuid: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub proper_name: String,
    #[serde(default)]
    pub pref_label: String,
    #[serde(default)]
    pub legal_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub hidden_label: String,
    #[serde(default)]
    pub trade_names: Option<Vec<String>>,
    #[serde(default)]
    pub local_names: Option<Vec<String>>,
    #[serde(default)]
    pub former_names: Option<Vec<String>>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub industry_classification: String,
    #[serde(default)]
    pub parent_organisation: String,
    #[serde(default)]
    pub alternative_identifiers: Option<AlternativeIdentifiers>,
    #[serde(default)]
    pub identifiers: Option<Vec<AuthorityIdentifier>>,
}

impl From<OrganisationWire> for CombinedOrganisation {
    fn from(wire: OrganisationWire) -> Self {
        let mut identifiers = Vec::new();
        if let Some(ref alt) = wire.alternative_identifiers {
            identifiers.extend(alt.normalise());
        }
        if let Some(ref list) = wire.identifiers {
            identifiers.extend(list.normalise());
        }

        Self {
            uuid: wire.uuid,
            kind: wire.kind,
            proper_name: wire.proper_name,
            pref_label: wire.pref_label,
            legal_name: wire.legal_name,
            short_name: wire.short_name,
            hidden_label: wire.hidden_label,
            industry_classification: wire.industry_classification,
            parent_organisation: wire.parent_organisation,
            trade_names: wire.trade_names,
            local_names: wire.local_names,
            former_names: wire.former_names,
            aliases: wire.aliases,
            identifiers,
        }
    }
}

/// Decode a record body into the normalised form.
pub fn decode_organisation(body: &str) -> Result<CombinedOrganisation, serde_json::Error> {
    serde_json::from_str::<OrganisationWire>(body).map(CombinedOrganisation::from)
}
