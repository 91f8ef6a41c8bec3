// orgrecon - organisation concordance reconciliation batch job

mod concordance;
mod exit_codes;
mod load;
mod options;
mod report;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{ErrorOutput, EXIT_SUCCESS, EXIT_USAGE};
use options::SettingsArgs;

#[derive(Parser)]
#[command(name = "orgrecon")]
#[command(about = "Reconcile composite and factset organisation records through the concordance")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the concordance, compare every organisation, report discrepancies
    #[command(after_help = "\
Examples:
  orgrecon run --composite-orgs-url http://composite/organisations/ \\
               --fs-transformer-url http://fs-transformer/transformers/organisations/
  COMPOSITE_ORGS_URL=... FS_TRANSFORMER_URL=... orgrecon run --json
  orgrecon run --config recon.toml --output report.json

Exit codes: 0 reconciled, 1 discrepancies, 2 usage, 3 load gave up, 4 report write")]
    Run {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Print the JSON report to stdout instead of one line per discrepancy
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Load the concordance feed once and print what it holds
    Concordance {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Print stats and the full index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate settings and print the effective configuration
    Validate {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  orgrecon-core ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
        "\nreport:  exit 0 reconciled, 1 discrepancies",
    )
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (result, json) = match cli.command {
        Commands::Run {
            settings,
            json,
            output,
        } => (run::cmd_run(settings, json, output), json),
        Commands::Concordance { settings, json } => {
            (concordance::cmd_concordance(settings, json), json)
        }
        Commands::Validate { settings } => (run::cmd_validate(settings), false),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if json {
                let out = ErrorOutput::new(code, &message, hint.as_deref());
                if let Ok(text) = serde_json::to_string(&out) {
                    eprintln!("{text}");
                }
            } else {
                if !message.is_empty() {
                    eprintln!("error: {}", message);
                }
                if let Some(hint) = hint {
                    eprintln!("hint:  {}", hint);
                }
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
