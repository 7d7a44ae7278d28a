//! Shutdown draining.

use std::sync::atomic::Ordering;

use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use super::core::{ArmedUnit, Scheduler};

/// Outcome counts from a [`Scheduler::dispose`] drain.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DrainSummary {
    /// Units that had already finished when the drain began.
    pub finished: usize,
    /// Units cancelled before their timer fired.
    pub cancelled: usize,
    /// In-flight units that completed within the wait bound.
    pub completed: usize,
    /// In-flight units still running when their wait bound elapsed.
    pub timed_out: usize,
    /// In-flight units that panicked outside the isolated job body.
    pub failed: usize,
}

impl Scheduler {
    /// Stop accepting arm requests and drain every outstanding unit.
    ///
    /// Units whose timer has not fired are cancelled outright. Units
    /// already running are awaited one after another, each bounded by
    /// the configured shutdown timeout — the aggregate wait is
    /// deliberately uncapped. Timeouts and failures during the wait are
    /// logged and never abort the drain of the remaining units; a
    /// timed-out body keeps running detached but will not re-arm.
    /// Idempotent: a second call returns an empty summary immediately.
    pub async fn dispose(&self) -> DrainSummary {
        let mut summary = DrainSummary::default();

        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            debug!("scheduler already disposed");
            return summary;
        }

        let drained: Vec<ArmedUnit> = {
            let mut armed = self.inner.armed.lock().unwrap();
            armed.drain().map(|(_, unit)| unit).collect()
        };
        info!(outstanding = drained.len(), "disposing scheduler");

        let mut must_wait = Vec::new();
        for unit in drained {
            if unit.handle.is_finished() {
                trace!(job = %unit.job_name, "unit already finished");
                summary.finished += 1;
            } else if !unit.fired.load(Ordering::SeqCst) {
                debug!(job = %unit.job_name, "cancelled before execution");
                unit.handle.abort();
                summary.cancelled += 1;
            } else {
                must_wait.push(unit);
            }
        }

        let timeout = self.inner.config.shutdown_timeout;
        for ArmedUnit {
            job_name, handle, ..
        } in must_wait
        {
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(())) => {
                    debug!(job = %job_name, "completed during drain");
                    summary.completed += 1;
                }
                Ok(Err(e)) if e.is_panic() => {
                    error!(job = %job_name, "unit panicked during drain");
                    summary.failed += 1;
                }
                Ok(Err(_)) => {
                    info!(job = %job_name, "unit cancelled during drain");
                    summary.cancelled += 1;
                }
                Err(_) => {
                    warn!(
                        job = %job_name,
                        wait = ?timeout,
                        "exceeded the maximum shutdown wait limit"
                    );
                    summary.timed_out += 1;
                }
            }
        }

        info!(?summary, "scheduler drain complete");
        summary
    }
}
