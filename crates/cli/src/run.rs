//! `orgrecon run`: load the concordance, reconcile, report.

use std::path::PathBuf;

use orgrecon_core::{ConcordanceStore, Reconciler};
use orgrecon_http_client::{FeedClient, HttpClient};

use crate::exit_codes::{EXIT_DISCREPANCIES, EXIT_LOAD_GAVE_UP, EXIT_USAGE};
use crate::load::load_with_retry;
use crate::options::{http_options, invalid_settings, SettingsArgs};
use crate::report;
use crate::CliError;

pub fn cmd_run(args: SettingsArgs, json: bool, output: Option<PathBuf>) -> Result<(), CliError> {
    let settings = args.resolve()?;
    settings.validate().map_err(invalid_settings)?;

    log::info!(
        "Starting reconciliation: composite {} factset {} (port {} reserved, no listener)",
        settings.composite_orgs_url,
        settings.fs_transformer_url,
        settings.port,
    );

    let http = HttpClient::new(http_options(&settings.http))
        .map_err(|e| CliError::usage(e.to_string()))?;
    let feed = FeedClient::new(http.clone(), settings.concordance_url.clone());
    let store = ConcordanceStore::new(feed, settings.concordance_schema);

    load_with_retry(&store, &settings.load).map_err(|(attempts, e)| CliError {
        code: EXIT_LOAD_GAVE_UP,
        message: format!("concordance load gave up after {attempts} attempts: {e}"),
        hint: Some("raise --max-attempts, or set it to 0 to retry forever".into()),
    })?;

    let config = settings.recon_config();
    let result = Reconciler::new(&store, &http, &config)
        .reconcile()
        .map_err(|e| CliError {
            code: EXIT_LOAD_GAVE_UP,
            message: format!("cannot reconcile: {e}"),
            hint: None,
        })?;

    report::emit(&result, json, output.as_deref())?;
    eprintln!("{}", report::summary_line(&result));

    if result.is_reconciled() {
        Ok(())
    } else {
        Err(CliError {
            code: EXIT_DISCREPANCIES,
            message: format!("{} discrepancies found", result.summary.discrepancies),
            hint: None,
        })
    }
}

/// `orgrecon validate`: check settings and print the effective file.
pub fn cmd_validate(args: SettingsArgs) -> Result<(), CliError> {
    let settings = args.resolve()?;
    settings.validate().map_err(invalid_settings)?;

    let text = settings.to_toml().map_err(|e| CliError {
        code: EXIT_USAGE,
        message: e.to_string(),
        hint: None,
    })?;
    print!("{text}");
    eprintln!("settings ok");
    Ok(())
}
