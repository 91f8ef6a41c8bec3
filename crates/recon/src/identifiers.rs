//! Identifier reconciliation.
//!
//! Every UUID the concordance associates with the factset record must be
//! claimed by the composite record under the UPP authority. Which shape the
//! composite record used on the wire no longer matters here: identifiers
//! were normalised at decode time.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::concordance::ConcordanceStore;
use crate::model::{CombinedOrganisation, Discrepancy, DiscrepancyKind, Field};

/// The factset record's own UUID plus every legacy UUID concorded to it.
///
/// Empty when the store is not loaded, or when the factset UUID does not
/// parse and nothing is concorded.
pub fn expected_uuids(factset: &CombinedOrganisation, store: &ConcordanceStore) -> BTreeSet<Uuid> {
    let own = match Uuid::parse_str(factset.uuid.trim()) {
        Ok(u) => u,
        Err(_) => {
            log::warn!("factset record uuid {:?} is not a UUID", factset.uuid);
            return BTreeSet::new();
        }
    };

    match store.lookup_legacy_uuids(&own) {
        Ok(lookup) => {
            let mut expected = lookup.legacy;
            expected.insert(own);
            expected
        }
        Err(e) => {
            log::warn!("cannot resolve concordance for {own}: {e}");
            BTreeSet::new()
        }
    }
}

/// Mark each expectation found if the composite record claims it.
/// Unmarked expectations become discrepancies, in UUID order.
pub fn reconcile_identifiers(
    entity: Uuid,
    expected: &BTreeSet<Uuid>,
    composite: &CombinedOrganisation,
    factset_uuid: &str,
    raw_legacy_id: impl Fn(&Uuid) -> Option<String>,
) -> Vec<Discrepancy> {
    if expected.is_empty() {
        return vec![Discrepancy::field(
            entity,
            Field::Identifiers,
            DiscrepancyKind::NoConcordedUuids {
                uuid: factset_uuid.to_string(),
            },
        )];
    }

    let mut found: BTreeMap<Uuid, bool> = expected.iter().map(|u| (*u, false)).collect();
    for claimed in composite.upp_uuids() {
        if let Some(mark) = found.get_mut(&claimed) {
            *mark = true;
        }
    }

    found
        .into_iter()
        .filter(|(_, seen)| !seen)
        .map(|(uuid, _)| {
            Discrepancy::field(
                entity,
                Field::Identifiers,
                DiscrepancyKind::MissingIdentifier {
                    uuid,
                    raw_legacy_id: raw_legacy_id(&uuid),
                },
            )
        })
        .collect()
}

/// Identifier discrepancies for one entity.
pub fn check_identifiers(
    entity: Uuid,
    composite: &CombinedOrganisation,
    factset: &CombinedOrganisation,
    store: &ConcordanceStore,
) -> Vec<Discrepancy> {
    let expected = expected_uuids(factset, store);
    reconcile_identifiers(entity, &expected, composite, &factset.uuid, |u| {
        store.raw_legacy_id(u)
    })
}
