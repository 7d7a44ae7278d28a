//! Failure routing for job executions.

use tracing::error;

/// Receives failures that escape a job body.
///
/// Decoupled from logging so callers can route job failures to alerting
/// without altering scheduling semantics. The engine guards every call
/// with `catch_unwind`: a sink that panics is itself logged and
/// swallowed.
pub trait FailureSink: Send + Sync {
    /// Handle one failure from the named job.
    fn report(&self, job: &str, error: &anyhow::Error);
}

/// Default sink: records the failure via `tracing`.
#[derive(Debug, Default)]
pub struct LogSink;

impl FailureSink for LogSink {
    fn report(&self, job: &str, error: &anyhow::Error) {
        error!(job = %job, error = %error, "scheduled job failed");
    }
}
