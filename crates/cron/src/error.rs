use thiserror::Error;

/// Errors surfaced synchronously to callers of the scheduling API.
///
/// Everything else — job failures, drain timeouts, rejected re-arms —
/// is absorbed inside the engine and only ever logged or routed to the
/// failure sink.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The expression text did not parse as a cron schedule.
    #[error("invalid cron expression '{expression}': {source}")]
    InvalidExpression {
        expression: String,
        #[source]
        source: cron::error::Error,
    },

    /// Blank expression text.
    #[error("empty cron expression")]
    EmptyExpression,
}
