use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Discrepancy, ReconSummary};

/// Key under which entity-level failures are counted.
pub const ENTITY_KEY: &str = "Entity";

/// Compute summary statistics from the discrepancies of one run.
pub fn compute_summary(entities: usize, discrepancies: &[Discrepancy]) -> ReconSummary {
    let mut field_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut failed = BTreeSet::new();
    let mut touched = BTreeSet::new();

    for d in discrepancies {
        touched.insert(d.entity);
        let key = match d.field {
            Some(field) => field.as_str(),
            None => {
                failed.insert(d.entity);
                ENTITY_KEY
            }
        };
        *field_counts.entry(key.to_string()).or_insert(0) += 1;
    }

    ReconSummary {
        entities,
        entities_failed: failed.len(),
        entities_with_discrepancies: touched.len(),
        discrepancies: discrepancies.len(),
        field_counts,
    }
}
