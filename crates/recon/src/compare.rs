//! Field-level comparison of a composite record against its factset variant.

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::ArrayMode;
use crate::model::{CombinedOrganisation, Discrepancy, DiscrepancyKind, Field};

/// Exact string equality.
pub fn compare_strings(composite: &str, factset: &str) -> Option<DiscrepancyKind> {
    if composite == factset {
        return None;
    }
    Some(DiscrepancyKind::ValueMismatch {
        composite: composite.to_string(),
        factset: factset.to_string(),
    })
}

/// Compare two optional name arrays.
///
/// Both absent matches. Exactly one absent is a presence mismatch, even when
/// the present one is empty. Otherwise lengths must agree and the contents
/// are checked per `mode`.
pub fn compare_arrays(
    composite: Option<&[String]>,
    factset: Option<&[String]>,
    mode: ArrayMode,
) -> Option<DiscrepancyKind> {
    let (c, f) = match (composite, factset) {
        (None, None) => return None,
        (Some(c), Some(f)) => (c, f),
        _ => {
            return Some(DiscrepancyKind::ArrayPresence {
                composite: composite.map(<[String]>::to_vec),
                factset: factset.map(<[String]>::to_vec),
            })
        }
    };

    if c.len() != f.len() {
        return Some(DiscrepancyKind::ArrayLength {
            composite: c.to_vec(),
            factset: f.to_vec(),
        });
    }

    let same = match mode {
        ArrayMode::Containment => c.iter().all(|value| f.contains(value)),
        ArrayMode::Multiset => counts(c) == counts(f),
    };

    if same {
        None
    } else {
        Some(DiscrepancyKind::ArrayContent {
            composite: c.to_vec(),
            factset: f.to_vec(),
        })
    }
}

fn counts(values: &[String]) -> HashMap<&str, usize> {
    let mut out = HashMap::with_capacity(values.len());
    for v in values {
        *out.entry(v.as_str()).or_insert(0) += 1;
    }
    out
}

/// Every scalar and array check, in report order. `None` means the field
/// matched.
pub fn field_checks(
    composite: &CombinedOrganisation,
    factset: &CombinedOrganisation,
    mode: ArrayMode,
) -> Vec<(Field, Option<DiscrepancyKind>)> {
    let arrays = |c: &Option<Vec<String>>, f: &Option<Vec<String>>| {
        compare_arrays(c.as_deref(), f.as_deref(), mode)
    };

    vec![
        (Field::Type, compare_strings(&composite.kind, &factset.kind)),
        (Field::ProperName, compare_strings(&composite.proper_name, &factset.proper_name)),
        (Field::PrefLabel, compare_strings(&composite.pref_label, &factset.pref_label)),
        (Field::LegalName, compare_strings(&composite.legal_name, &factset.legal_name)),
        (Field::ShortName, compare_strings(&composite.short_name, &factset.short_name)),
        (Field::HiddenLabel, compare_strings(&composite.hidden_label, &factset.hidden_label)),
        (
            Field::IndustryClassification,
            compare_strings(&composite.industry_classification, &factset.industry_classification),
        ),
        (
            Field::ParentOrganisation,
            compare_strings(&composite.parent_organisation, &factset.parent_organisation),
        ),
        (Field::TradeNames, arrays(&composite.trade_names, &factset.trade_names)),
        (Field::LocalNames, arrays(&composite.local_names, &factset.local_names)),
        (Field::FormerNames, arrays(&composite.former_names, &factset.former_names)),
        (Field::Aliases, arrays(&composite.aliases, &factset.aliases)),
    ]
}

/// Failing field checks for one entity.
pub fn check_fields(
    entity: Uuid,
    composite: &CombinedOrganisation,
    factset: &CombinedOrganisation,
    mode: ArrayMode,
) -> Vec<Discrepancy> {
    field_checks(composite, factset, mode)
        .into_iter()
        .filter_map(|(field, result)| result.map(|kind| Discrepancy::field(entity, field, kind)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn equal_strings_match() {
        assert_eq!(compare_strings("Acme", "Acme"), None);
        assert_eq!(compare_strings("", ""), None);
    }

    #[test]
    fn different_strings_carry_both_values() {
        assert_eq!(
            compare_strings("Acme", "ACME"),
            Some(DiscrepancyKind::ValueMismatch {
                composite: "Acme".into(),
                factset: "ACME".into(),
            })
        );
    }

    #[test]
    fn arrays_are_order_insensitive() {
        let c = names(&["Acme", "Acme Inc"]);
        let f = names(&["Acme Inc", "Acme"]);
        assert_eq!(compare_arrays(Some(c.as_slice()), Some(f.as_slice()), ArrayMode::Containment), None);
        assert_eq!(compare_arrays(Some(c.as_slice()), Some(f.as_slice()), ArrayMode::Multiset), None);
    }

    #[test]
    fn absent_vs_empty_is_a_mismatch() {
        let empty: Vec<String> = vec![];
        assert_eq!(
            compare_arrays(None, Some(empty.as_slice()), ArrayMode::Containment),
            Some(DiscrepancyKind::ArrayPresence {
                composite: None,
                factset: Some(vec![]),
            })
        );
        assert!(compare_arrays(Some(empty.as_slice()), None, ArrayMode::Containment).is_some());
    }

    #[test]
    fn both_absent_match() {
        assert_eq!(compare_arrays(None, None, ArrayMode::Multiset), None);
    }

    #[test]
    fn length_mismatch() {
        let c = names(&["Acme"]);
        let f = names(&["Acme", "Acme Inc"]);
        assert!(matches!(
            compare_arrays(Some(c.as_slice()), Some(f.as_slice()), ArrayMode::Containment),
            Some(DiscrepancyKind::ArrayLength { .. })
        ));
    }

    #[test]
    fn content_mismatch() {
        let c = names(&["Acme", "Widgets"]);
        let f = names(&["Acme", "Gadgets"]);
        assert!(matches!(
            compare_arrays(Some(c.as_slice()), Some(f.as_slice()), ArrayMode::Containment),
            Some(DiscrepancyKind::ArrayContent { .. })
        ));
    }

    #[test]
    fn containment_ignores_multiplicity_multiset_does_not() {
        let c = names(&["a", "a", "b"]);
        let f = names(&["a", "b", "b"]);
        assert_eq!(compare_arrays(Some(c.as_slice()), Some(f.as_slice()), ArrayMode::Containment), None);
        assert!(matches!(
            compare_arrays(Some(c.as_slice()), Some(f.as_slice()), ArrayMode::Multiset),
            Some(DiscrepancyKind::ArrayContent { .. })
        ));
    }

    #[test]
    fn identical_records_have_no_discrepancies() {
        let org = CombinedOrganisation {
            uuid: "u".into(),
            kind: "PublicCompany".into(),
            proper_name: "Acme".into(),
            trade_names: Some(names(&["Acme"])),
            ..Default::default()
        };
        let entity = Uuid::nil();
        assert!(check_fields(entity, &org, &org.clone(), ArrayMode::Containment).is_empty());
        assert_eq!(field_checks(&org, &org, ArrayMode::Containment).len(), 12);
    }

    #[test]
    fn each_failing_field_is_reported_once() {
        let composite = CombinedOrganisation {
            kind: "PublicCompany".into(),
            proper_name: "Acme".into(),
            aliases: Some(names(&["A"])),
            ..Default::default()
        };
        let factset = CombinedOrganisation {
            kind: "Company".into(),
            proper_name: "Acme".into(),
            ..Default::default()
        };
        let out = check_fields(Uuid::nil(), &composite, &factset, ArrayMode::Containment);
        let fields: Vec<Field> = out.iter().filter_map(|d| d.field).collect();
        assert_eq!(fields, vec![Field::Type, Field::Aliases]);
    }
}
