//! Settings resolution: file, then environment and flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use orgrecon_config::{HttpSettings, Settings};
use orgrecon_core::{ArrayMode, FeedSchema};
use orgrecon_http_client::HttpOptions;

use crate::exit_codes::EXIT_USAGE;
use crate::CliError;

#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Settings file [default: <config dir>/orgrecon/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Composite organisations base URL (record URL = base + uuid)
    #[arg(long, env = "COMPOSITE_ORGS_URL")]
    pub composite_orgs_url: Option<String>,

    /// Factset transformer base URL (record URL = base + uuid)
    #[arg(long, env = "FS_TRANSFORMER_URL")]
    pub fs_transformer_url: Option<String>,

    /// Concordance feed URL
    #[arg(long, env = "CONCORDANCE_URL")]
    pub concordance_url: Option<String>,

    /// Concordance feed schema: tme or factset
    #[arg(long, value_name = "SCHEMA")]
    pub concordance_schema: Option<FeedSchema>,

    /// Port reserved for the admin endpoint (logged only)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Name array comparison: containment or multiset
    #[arg(long, value_name = "MODE")]
    pub array_mode: Option<ArrayMode>,

    /// Seconds between concordance load attempts
    #[arg(long, value_name = "SECS")]
    pub retry_delay_secs: Option<u64>,

    /// Give up after this many load attempts (0 = never)
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Per-request retries for 429/5xx/network errors
    #[arg(long, value_name = "N")]
    pub http_retries: Option<u32>,

    /// Per-request timeout
    #[arg(long, value_name = "SECS")]
    pub http_timeout_secs: Option<u64>,
}

impl SettingsArgs {
    /// Load the settings file and apply every override that was given.
    /// Does not validate.
    pub fn resolve(&self) -> Result<Settings, CliError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        }
        .map_err(|e| {
            CliError::usage(e.to_string()).with_hint(format!(
                "default location is {}",
                Settings::config_path().display()
            ))
        })?;

        if let Some(ref v) = self.composite_orgs_url {
            settings.composite_orgs_url = v.clone();
        }
        if let Some(ref v) = self.fs_transformer_url {
            settings.fs_transformer_url = v.clone();
        }
        if let Some(ref v) = self.concordance_url {
            settings.concordance_url = v.clone();
        }
        if let Some(v) = self.concordance_schema {
            settings.concordance_schema = v;
        }
        if let Some(v) = self.port {
            settings.port = v;
        }
        if let Some(v) = self.array_mode {
            settings.compare.array_mode = v;
        }
        if let Some(v) = self.retry_delay_secs {
            settings.load.retry_delay_secs = v;
        }
        if let Some(v) = self.max_attempts {
            settings.load.max_attempts = v;
        }
        if let Some(v) = self.http_retries {
            settings.http.max_retries = v;
        }
        if let Some(v) = self.http_timeout_secs {
            settings.http.timeout_secs = v;
        }
        Ok(settings)
    }
}

pub fn http_options(http: &HttpSettings) -> HttpOptions {
    HttpOptions {
        timeout: Duration::from_secs(http.timeout_secs),
        tcp_keepalive: Duration::from_secs(http.tcp_keepalive_secs),
        pool_max_idle_per_host: http.pool_max_idle_per_host,
        max_retries: http.max_retries,
        ..HttpOptions::default()
    }
}

pub fn invalid_settings(err: orgrecon_config::ConfigError) -> CliError {
    CliError {
        code: EXIT_USAGE,
        message: err.to_string(),
        hint: Some(
            "set it in the config file, with a flag, or via COMPOSITE_ORGS_URL / FS_TRANSFORMER_URL / CONCORDANCE_URL"
                .into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn flags_override_file() {
        let file = config_file(
            "composite_orgs_url = \"http://file-composite/\"\nport = 9000\n[load]\nmax_attempts = 7\n",
        );
        let args = SettingsArgs {
            config: Some(file.path().to_path_buf()),
            composite_orgs_url: Some("http://flag-composite/".into()),
            array_mode: Some(ArrayMode::Multiset),
            ..SettingsArgs::default()
        };

        let s = args.resolve().unwrap();
        assert_eq!(s.composite_orgs_url, "http://flag-composite/");
        assert_eq!(s.port, 9000);
        assert_eq!(s.load.max_attempts, 7);
        assert_eq!(s.compare.array_mode, ArrayMode::Multiset);
    }

    #[test]
    fn missing_explicit_config_is_usage_error() {
        let args = SettingsArgs {
            config: Some(PathBuf::from("/nonexistent/orgrecon.toml")),
            ..SettingsArgs::default()
        };
        let err = args.resolve().unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.message.contains("/nonexistent/orgrecon.toml"));
    }

    #[test]
    fn http_options_follow_settings() {
        let http = HttpSettings {
            timeout_secs: 5,
            max_retries: 1,
            pool_max_idle_per_host: 4,
            tcp_keepalive_secs: 10,
        };
        let opts = http_options(&http);
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert_eq!(opts.max_retries, 1);
        assert_eq!(opts.pool_max_idle_per_host, 4);
        assert_eq!(opts.tcp_keepalive, Duration::from_secs(10));
    }
}
