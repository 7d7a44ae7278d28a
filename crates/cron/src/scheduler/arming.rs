use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::SchedulerError;
use crate::job::Job;
use crate::schedule::CronSchedule;

use super::core::{ArmedUnit, Inner, Scheduler};
use super::firing;

impl Scheduler {
    /// Arm every configured binding.
    ///
    /// Expression text is parsed here; the first parse failure aborts the
    /// whole start so the engine never comes up partially configured.
    /// Bindings whose schedule has no next occurrence are logged and
    /// skipped. Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), SchedulerError> {
        info!(
            count = self.inner.bindings.len(),
            "scheduling configured bindings"
        );

        // Resolve everything before arming anything.
        let mut resolved = Vec::with_capacity(self.inner.bindings.len());
        for binding in &self.inner.bindings {
            resolved.push((Arc::clone(binding.job()), binding.resolve()?));
        }

        for (job, schedule) in resolved {
            arm_initial(&self.inner, job, schedule);
        }
        Ok(())
    }

    /// Schedule a job at runtime.
    ///
    /// The expression is parsed immediately; invalid or empty text is an
    /// argument error and mutates no state. After disposal the request is
    /// logged and dropped.
    pub fn schedule(&self, job: Arc<dyn Job>, expression: &str) -> Result<(), SchedulerError> {
        let schedule = CronSchedule::parse(expression)?;
        if self.inner.disposed.load(Ordering::SeqCst) {
            warn!(job = %job.name(), "scheduler disposed, dropping schedule request");
            return Ok(());
        }
        arm_initial(&self.inner, job, schedule);
        Ok(())
    }
}

/// Compute the initial delay from now and arm, skipping schedules that
/// can never fire.
fn arm_initial(inner: &Arc<Inner>, job: Arc<dyn Job>, schedule: CronSchedule) {
    match schedule.delay_from(Utc::now()) {
        None => info!(
            job = %job.name(),
            expression = %schedule.expression(),
            "cron expression is never satisfied, skipping"
        ),
        Some(delay) => {
            info!(job = %job.name(), ?delay, "scheduling job");
            arm(inner, job, schedule, delay);
        }
    }
}

/// Register a timer for a unit's next occurrence.
///
/// The table lock is held across the shutdown check, the spawn, and the
/// insert. `dispose()` sets the flag before draining under the same lock,
/// so a unit is either refused here or visible to the drain; none can
/// slip between the two.
pub(super) fn arm(inner: &Arc<Inner>, job: Arc<dyn Job>, schedule: CronSchedule, delay: Duration) {
    let mut armed = inner.armed.lock().unwrap();
    if inner.disposed.load(Ordering::SeqCst) {
        debug!(job = %job.name(), "suppressing arm due to shutdown");
        return;
    }

    let id = inner.next_unit_id.fetch_add(1, Ordering::Relaxed);
    let fired = Arc::new(AtomicBool::new(false));
    let job_name = job.name().to_string();

    let unit_inner = Arc::clone(inner);
    let unit_fired = Arc::clone(&fired);
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        firing::fire(unit_inner, job, schedule, id, unit_fired).await;
    });

    armed.insert(
        id,
        ArmedUnit {
            job_name,
            handle,
            fired,
        },
    );
}
