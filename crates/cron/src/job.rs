//! The unit of schedulable work.

use async_trait::async_trait;

/// A job the engine can execute on a cron schedule.
///
/// Implementations are shared behind an `Arc` and may run on any worker
/// thread, but two occurrences of the same binding never overlap: the
/// next occurrence is armed only after the previous body has completed.
#[async_trait]
pub trait Job: Send + Sync {
    /// Human-readable name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Whether this occurrence should execute at all.
    ///
    /// Returning `false` skips the body for this cycle but keeps the
    /// binding armed — skip, don't stop. Stateful jobs use this to hold
    /// off while a precondition is unmet. Defaults to always eligible.
    fn is_runnable(&self) -> bool {
        true
    }

    /// Execute one occurrence.
    ///
    /// Errors (and panics) are routed to the configured
    /// [`FailureSink`](crate::sink::FailureSink) and never stop the
    /// schedule, neither for this binding nor for its siblings.
    async fn run(&self) -> anyhow::Result<()>;
}
