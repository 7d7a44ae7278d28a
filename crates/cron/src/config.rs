//! Environment-based scheduler configuration.

use std::env;
use std::time::Duration;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Scheduler tunables.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum time `dispose()` waits for each in-flight job.
    pub shutdown_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(60),
        }
    }
}

impl SchedulerConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    ///
    /// - `SCHEDULER_SHUTDOWN_TIMEOUT` — integer count (default `1`)
    /// - `SCHEDULER_SHUTDOWN_TIMEOUT_UNIT` — `ms`, `s`, `m` or `h` (default `m`)
    pub fn from_env() -> Self {
        let value: u64 = env_or("SCHEDULER_SHUTDOWN_TIMEOUT", "1")
            .parse()
            .unwrap_or(1);
        let unit = env_or("SCHEDULER_SHUTDOWN_TIMEOUT_UNIT", "m");
        let shutdown_timeout = duration_from(value, &unit).unwrap_or_else(|| {
            tracing::warn!(unit = %unit, "unknown shutdown timeout unit, assuming minutes");
            Duration::from_secs(value * 60)
        });
        Self { shutdown_timeout }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!(
            "Scheduler config: shutdown_timeout={:?}",
            self.shutdown_timeout
        );
    }

    /// Return a view safe for API responses and diagnostics.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "shutdown_timeout_ms": self.shutdown_timeout.as_millis() as u64,
        })
    }
}

/// Convert a count plus unit suffix into a [`Duration`].
pub(crate) fn duration_from(value: u64, unit: &str) -> Option<Duration> {
    match unit.trim() {
        "ms" => Some(Duration::from_millis(value)),
        "s" => Some(Duration::from_secs(value)),
        "m" => Some(Duration::from_secs(value * 60)),
        "h" => Some(Duration::from_secs(value * 3_600)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shutdown_timeout_is_one_minute() {
        assert_eq!(
            SchedulerConfig::default().shutdown_timeout,
            Duration::from_secs(60)
        );
    }

    #[test]
    fn duration_from_units() {
        assert_eq!(duration_from(250, "ms"), Some(Duration::from_millis(250)));
        assert_eq!(duration_from(30, "s"), Some(Duration::from_secs(30)));
        assert_eq!(duration_from(2, "m"), Some(Duration::from_secs(120)));
        assert_eq!(duration_from(1, "h"), Some(Duration::from_secs(3_600)));
    }

    #[test]
    fn duration_from_unknown_unit() {
        assert_eq!(duration_from(1, "fortnights"), None);
    }

    #[test]
    fn summary_reports_timeout_in_millis() {
        let config = SchedulerConfig {
            shutdown_timeout: Duration::from_secs(5),
        };
        assert_eq!(config.summary()["shutdown_timeout_ms"], 5_000);
    }
}
