use std::path::PathBuf;

use orgrecon_core::wire::decode_organisation;
use orgrecon_core::{
    to_legacy_uuid, ArrayMode, CombinedOrganisation, ConcordanceStore, DiscrepancyKind,
    FeedSchema, FetchError, Field, ReconConfig, ReconReport, Reconciler, RecordFetcher,
};
use uuid::Uuid;

const ACME: &str = "dff0a002-1ec2-3b4a-af6a-ec2980489996";
const ZETA: &str = "0fae8d12-471e-375d-adc1-a1d4d7522520";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

/// Serves `http://composite/<uuid>` and `http://factset/<uuid>` from
/// fixture files. Missing files are 404s.
struct FixtureFetcher {
    skip: Option<String>,
}

impl RecordFetcher for FixtureFetcher {
    fn fetch(&self, url: &str) -> Result<CombinedOrganisation, FetchError> {
        let not_found = || FetchError::Status {
            url: url.to_string(),
            status: 404,
        };
        if self.skip.as_deref() == Some(url) {
            return Err(not_found());
        }
        let rel = url.strip_prefix("http://").ok_or_else(not_found)?;
        let path = fixtures_dir().join(format!("{rel}.json"));
        let body = std::fs::read_to_string(&path).map_err(|_| not_found())?;
        decode_organisation(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn loaded_store() -> ConcordanceStore {
    let body = std::fs::read_to_string(fixtures_dir().join("concordance_tme.json")).unwrap();
    let store = ConcordanceStore::new(move || Ok::<_, FetchError>(body.clone()), FeedSchema::Tme);
    let stats = store.load().unwrap();
    assert_eq!(stats.accepted, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.keys, 2);
    store
}

fn run_with(fetcher: FixtureFetcher, mode: ArrayMode) -> ReconReport {
    let store = loaded_store();
    let config = ReconConfig::new("http://composite/", "http://factset/").with_array_mode(mode);
    Reconciler::new(&store, &fetcher, &config)
        .reconcile()
        .unwrap()
}

// -------------------------------------------------------------------------
// Full pass
// -------------------------------------------------------------------------

#[test]
fn acme_reconciles_across_identifier_shapes() {
    let report = run_with(FixtureFetcher { skip: None }, ArrayMode::Containment);
    assert!(report.discrepancies.iter().all(|d| d.entity != uuid(ACME)));
}

#[test]
fn zeta_reports_field_and_identifier_discrepancies() {
    let report = run_with(FixtureFetcher { skip: None }, ArrayMode::Containment);
    let zeta: Vec<_> = report
        .discrepancies
        .iter()
        .filter(|d| d.entity == uuid(ZETA))
        .collect();

    let fields: Vec<Option<Field>> = zeta.iter().map(|d| d.field).collect();
    assert_eq!(
        fields,
        vec![Some(Field::ProperName), Some(Field::Aliases), Some(Field::Identifiers)]
    );
    assert!(matches!(zeta[1].kind, DiscrepancyKind::ArrayPresence { .. }));
    assert_eq!(
        zeta[2].kind,
        DiscrepancyKind::MissingIdentifier {
            uuid: to_legacy_uuid("000BJG-E"),
            raw_legacy_id: Some("000BJG-E".into()),
        }
    );
    assert_eq!(
        zeta[2].to_string(),
        format!(
            "[{ZETA}] Identifiers: no UPP identifier found for fc6ee108-c3c6-33b7-8fc6-825aa125bf3e (legacy id 000BJG-E)"
        )
    );

    assert_eq!(report.summary.entities, 2);
    assert_eq!(report.summary.entities_with_discrepancies, 1);
    assert_eq!(report.summary.entities_failed, 0);
    assert_eq!(report.summary.discrepancies, 3);
    assert!(!report.is_reconciled());
}

#[test]
fn missing_record_is_entity_level_and_others_still_compared() {
    let fetcher = FixtureFetcher {
        skip: Some(format!("http://factset/{ACME}")),
    };
    let report = run_with(fetcher, ArrayMode::Containment);

    let acme: Vec<_> = report
        .discrepancies
        .iter()
        .filter(|d| d.entity == uuid(ACME))
        .collect();
    assert_eq!(acme.len(), 1);
    assert!(acme[0].is_entity_level());
    assert!(acme[0].to_string().contains("returned HTTP 404"));

    assert_eq!(report.summary.entities_failed, 1);
    assert_eq!(report.summary.field_counts["Entity"], 1);
    assert!(report.discrepancies.iter().any(|d| d.entity == uuid(ZETA)));
}

#[test]
fn multiset_mode_accepts_reordered_names() {
    let report = run_with(FixtureFetcher { skip: None }, ArrayMode::Multiset);
    assert!(report.discrepancies.iter().all(|d| d.entity != uuid(ACME)));
}

// -------------------------------------------------------------------------
// Report serialisation
// -------------------------------------------------------------------------

#[test]
fn report_json_shape() {
    let report = run_with(FixtureFetcher { skip: None }, ArrayMode::Containment);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["meta"]["concordance_schema"], "tme");
    assert_eq!(json["meta"]["array_mode"], "containment");
    assert_eq!(json["summary"]["discrepancies"], 3);
    assert_eq!(json["summary"]["field_counts"]["ProperName"], 1);

    let first = &json["discrepancies"][0];
    assert_eq!(first["entity"], ZETA);
    assert_eq!(first["field"], "ProperName");
    assert_eq!(first["kind"], "value_mismatch");
    assert_eq!(first["composite"], "Zeta Holdings");
    assert_eq!(first["factset"], "Zeta Holdings plc");
}
