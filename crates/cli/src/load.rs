//! Concordance load with a fixed retry delay.

use std::thread;
use std::time::Duration;

use orgrecon_config::LoadSettings;
use orgrecon_core::{ConcordanceStore, LoadError, LoadStats};

/// Retry `store.load()` until it succeeds. `max_attempts == 0` retries
/// forever; otherwise the last error is returned once the budget is spent.
pub fn load_with_retry(
    store: &ConcordanceStore,
    policy: &LoadSettings,
) -> Result<LoadStats, (u32, LoadError)> {
    let delay = Duration::from_secs(policy.retry_delay_secs);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match store.load() {
            Ok(stats) => return Ok(stats),
            Err(e) => {
                if policy.max_attempts != 0 && attempt >= policy.max_attempts {
                    log::error!("{e}");
                    return Err((attempt, e));
                }
                log::error!("{e}; retrying in {}s (attempt {attempt})", delay.as_secs());
                thread::sleep(delay);
            }
        }
    }
}
