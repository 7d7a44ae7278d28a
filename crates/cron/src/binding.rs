//! Configuration-time (job, schedule) pairings.

use std::sync::Arc;

use crate::error::SchedulerError;
use crate::job::Job;
use crate::schedule::CronSchedule;

/// Where a binding's schedule comes from.
#[derive(Debug, Clone)]
pub enum ScheduleSource {
    /// Expression text, parsed at [`Scheduler::start`](crate::Scheduler::start).
    Expression(String),
    /// An already parsed schedule, used as-is.
    Parsed(CronSchedule),
}

/// Immutable pairing of a job and its schedule source.
///
/// Bindings are created once at configuration time and never removed
/// individually; each produces exactly one live rescheduling unit per
/// engine lifetime.
#[derive(Clone)]
pub struct TriggerBinding {
    job: Arc<dyn Job>,
    source: ScheduleSource,
}

impl TriggerBinding {
    pub fn new(job: Arc<dyn Job>, source: ScheduleSource) -> Self {
        Self { job, source }
    }

    pub fn job(&self) -> &Arc<dyn Job> {
        &self.job
    }

    /// Resolve the schedule, parsing expression text if necessary.
    pub fn resolve(&self) -> Result<CronSchedule, SchedulerError> {
        match &self.source {
            ScheduleSource::Expression(text) => CronSchedule::parse(text),
            ScheduleSource::Parsed(schedule) => Ok(schedule.clone()),
        }
    }
}
