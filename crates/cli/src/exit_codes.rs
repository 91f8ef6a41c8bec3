//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: schedulers and alerting rely
//! on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (fully reconciled, or command completed)     |
//! | 1    | Reconciliation found discrepancies                   |
//! | 2    | Usage or configuration error                         |
//! | 3    | Concordance load gave up (`max_attempts` reached)    |
//! | 4    | Report could not be written                          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use serde::Serialize;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Discrepancies found. Like `diff(1)`, exit 1 means "records differ."
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Usage error - bad arguments, missing or invalid settings.
pub const EXIT_USAGE: u8 = 2;

/// Every concordance load attempt failed and `max_attempts` was reached.
pub const EXIT_LOAD_GAVE_UP: u8 = 3;

/// `--output` file (or stdout) could not be written.
pub const EXIT_REPORT_WRITE: u8 = 4;

/// Structured error output, printed to stderr when `--json` is set.
#[derive(Debug, Serialize)]
pub struct ErrorOutput<'a> {
    pub error: &'static str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'a str>,
    pub exit_code: u8,
}

impl<'a> ErrorOutput<'a> {
    pub fn new(code: u8, message: &'a str, hint: Option<&'a str>) -> Self {
        Self {
            error: error_name(code),
            message,
            hint,
            exit_code: code,
        }
    }
}

/// Stable machine-readable name for an exit code.
pub fn error_name(code: u8) -> &'static str {
    match code {
        EXIT_SUCCESS => "ok",
        EXIT_DISCREPANCIES => "discrepancies",
        EXIT_USAGE => "usage",
        EXIT_LOAD_GAVE_UP => "load_gave_up",
        EXIT_REPORT_WRITE => "report_write",
        _ => "error",
    }
}
