//! Report output: human lines on stdout, JSON on request.

use std::io::Write;
use std::path::Path;

use orgrecon_core::ReconReport;

use crate::exit_codes::EXIT_REPORT_WRITE;
use crate::CliError;

fn write_err(msg: impl Into<String>) -> CliError {
    CliError {
        code: EXIT_REPORT_WRITE,
        message: msg.into(),
        hint: None,
    }
}

/// One line per discrepancy.
pub fn render_human(report: &ReconReport) -> String {
    let mut out = String::new();
    for d in &report.discrepancies {
        out.push_str(&d.to_string());
        out.push('\n');
    }
    out
}

pub fn summary_line(report: &ReconReport) -> String {
    let s = &report.summary;
    format!(
        "{} organisations: {} with discrepancies ({} could not be compared), {} discrepancies",
        s.entities, s.entities_with_discrepancies, s.entities_failed, s.discrepancies,
    )
}

/// Emit the report. `--output` always gets JSON; stdout gets JSON with
/// `--json`, otherwise the human lines.
pub fn emit(report: &ReconReport, json: bool, output: Option<&Path>) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(report)
        .map_err(|e| write_err(format!("JSON serialization error: {e}")))?;

    if let Some(path) = output {
        std::fs::write(path, &json_str)
            .map_err(|e| write_err(format!("cannot write {}: {e}", path.display())))?;
        log::info!("wrote {}", path.display());
    }

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let body = if json {
        json_str + "\n"
    } else {
        render_human(report)
    };
    handle
        .write_all(body.as_bytes())
        .and_then(|_| handle.flush())
        .map_err(|e| write_err(format!("cannot write report: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgrecon_core::model::ReconMeta;
    use orgrecon_core::{
        ArrayMode, Discrepancy, DiscrepancyKind, FeedSchema, Field, ReconSummary,
    };
    use uuid::Uuid;

    fn report(discrepancies: Vec<Discrepancy>) -> ReconReport {
        ReconReport {
            meta: ReconMeta {
                engine_version: "0.0.0".into(),
                run_at: "2026-01-01T00:00:00+00:00".into(),
                composite_base_url: "http://composite/".into(),
                factset_base_url: "http://factset/".into(),
                concordance_schema: FeedSchema::Tme,
                array_mode: ArrayMode::Containment,
            },
            summary: orgrecon_core::evidence::compute_summary(2, &discrepancies),
            discrepancies,
        }
    }

    #[test]
    fn human_lines_and_summary() {
        let entity = Uuid::from_u128(7);
        let r = report(vec![Discrepancy::field(
            entity,
            Field::ShortName,
            DiscrepancyKind::ValueMismatch {
                composite: "A".into(),
                factset: "B".into(),
            },
        )]);

        assert_eq!(
            render_human(&r),
            format!("[{entity}] ShortName: not identical - composite: \"A\", factset: \"B\"\n")
        );
        assert_eq!(
            summary_line(&r),
            "2 organisations: 1 with discrepancies (0 could not be compared), 1 discrepancies"
        );
    }

    #[test]
    fn output_file_gets_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let r = report(vec![]);
        assert_eq!(r.summary, ReconSummary { entities: 2, ..Default::default() });

        emit(&r, false, Some(&path)).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["entities"], 2);
        assert_eq!(json["meta"]["factset_base_url"], "http://factset/");
    }

    #[test]
    fn unwritable_output_is_report_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("report.json");
        let err = emit(&report(vec![]), false, Some(&path)).unwrap_err();
        assert_eq!(err.code, EXIT_REPORT_WRITE);
    }
}
