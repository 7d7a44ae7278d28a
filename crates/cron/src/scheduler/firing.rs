//! The self-perpetuating execution unit.
//!
//! Each armed occurrence runs [`fire`] exactly once: check for shutdown,
//! execute the job body with failures isolated, drop the outstanding
//! entry, then re-arm for the next occurrence.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, error, info, trace};

use crate::job::Job;
use crate::schedule::CronSchedule;

use super::arming;
use super::core::Inner;

pub(super) async fn fire(
    inner: Arc<Inner>,
    job: Arc<dyn Job>,
    schedule: CronSchedule,
    id: u64,
    fired: Arc<AtomicBool>,
) {
    // Mark the unit fired before reading the disposed flag. dispose()
    // does the mirror image (set flag, then read `fired`), so either
    // this unit sees the shutdown and suppresses itself, or dispose sees
    // it fired and waits instead of aborting mid-body.
    fired.store(true, Ordering::SeqCst);

    if inner.disposed.load(Ordering::SeqCst) {
        debug!(job = %job.name(), "suppressing scheduled execution due to shutdown");
        inner.armed.lock().unwrap().remove(&id);
        return;
    }

    let started_at = Utc::now();

    if job.is_runnable() {
        trace!(job = %job.name(), "performing scheduled execution");
        match AssertUnwindSafe(job.run()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => report(&inner, job.name(), &e),
            Err(panic) => {
                let e = anyhow!("job panicked: {}", panic_message(&*panic));
                report(&inner, job.name(), &e);
            }
        }
    } else {
        debug!(job = %job.name(), "job not currently runnable, skipping this occurrence");
    }

    inner.armed.lock().unwrap().remove(&id);

    if inner.disposed.load(Ordering::SeqCst) {
        debug!(job = %job.name(), "suppressing re-arm due to shutdown");
        return;
    }

    // The next occurrence is computed from this firing's own start
    // timestamp, never a stale one.
    match schedule.delay_from(started_at) {
        None => info!(
            job = %job.name(),
            expression = %schedule.expression(),
            "cron expression is no longer satisfied, job terminates"
        ),
        Some(delay) => {
            debug!(job = %job.name(), ?delay, "re-arming for next occurrence");
            arming::arm(&inner, job, schedule, delay);
        }
    }
}

/// Route a failure to the sink; a panicking sink is logged and swallowed.
fn report(inner: &Inner, job: &str, error: &anyhow::Error) {
    let sink = Arc::clone(&inner.sink);
    if std::panic::catch_unwind(AssertUnwindSafe(|| sink.report(job, error))).is_err() {
        error!(job = %job, "failure sink panicked while handling a job failure");
    }
}

/// Best-effort extraction of a panic payload message.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
