//! `orgrecon concordance`: load the feed once and report what it holds.

use orgrecon_core::ConcordanceStore;
use orgrecon_http_client::{FeedClient, HttpClient};
use serde::Serialize;

use crate::exit_codes::{EXIT_LOAD_GAVE_UP, EXIT_REPORT_WRITE};
use crate::load::load_with_retry;
use crate::options::{http_options, invalid_settings, SettingsArgs};
use crate::CliError;

#[derive(Serialize)]
struct ConcordanceOutput<'a> {
    url: &'a str,
    schema: orgrecon_core::FeedSchema,
    stats: orgrecon_core::LoadStats,
    concordances: &'a orgrecon_core::concordance::ConcordanceIndex,
}

pub fn cmd_concordance(args: SettingsArgs, json: bool) -> Result<(), CliError> {
    let settings = args.resolve()?;
    settings.validate_feed().map_err(invalid_settings)?;

    let http = HttpClient::new(http_options(&settings.http))
        .map_err(|e| CliError::usage(e.to_string()))?;
    let store = ConcordanceStore::new(
        FeedClient::new(http, settings.concordance_url.clone()),
        settings.concordance_schema,
    );

    let stats = load_with_retry(&store, &settings.load).map_err(|(attempts, e)| CliError {
        code: EXIT_LOAD_GAVE_UP,
        message: format!("concordance load gave up after {attempts} attempts: {e}"),
        hint: None,
    })?;

    if json {
        let index = store.snapshot().map_err(|e| CliError::usage(e.to_string()))?;
        let out = ConcordanceOutput {
            url: &settings.concordance_url,
            schema: settings.concordance_schema,
            stats,
            concordances: &index,
        };
        let text = serde_json::to_string_pretty(&out).map_err(|e| CliError {
            code: EXIT_REPORT_WRITE,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{text}");
    } else {
        println!(
            "{} organisations, {} concordances accepted, {} incomplete entries skipped",
            stats.keys, stats.accepted, stats.skipped,
        );
    }
    Ok(())
}
