use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::info;

use crate::binding::{ScheduleSource, TriggerBinding};
use crate::config::SchedulerConfig;
use crate::job::Job;
use crate::schedule::CronSchedule;
use crate::sink::{FailureSink, LogSink};

/// One armed or running occurrence.
pub(super) struct ArmedUnit {
    pub(super) job_name: String,
    pub(super) handle: JoinHandle<()>,
    /// Set the moment the unit's timer fires; past this point the unit
    /// is never aborted, only waited on.
    pub(super) fired: Arc<AtomicBool>,
}

/// Shared engine state, reachable from every armed unit.
pub(super) struct Inner {
    pub(super) config: SchedulerConfig,
    pub(super) bindings: Vec<TriggerBinding>,
    pub(super) sink: Arc<dyn FailureSink>,
    /// Write-once shutdown flag, checked at body entry and before every
    /// re-arm. Owned by this engine instance, not process-wide.
    pub(super) disposed: AtomicBool,
    /// Outstanding units by unit id. The one concurrently mutated
    /// structure in the engine: firing callbacks remove their own entry
    /// while `dispose()` drains.
    pub(super) armed: Mutex<HashMap<u64, ArmedUnit>>,
    pub(super) next_unit_id: AtomicU64,
}

/// The scheduling engine.
///
/// Arms one rescheduling unit per binding at [`start`](Scheduler::start),
/// accepts further jobs at runtime via [`schedule`](Scheduler::schedule),
/// and drains everything outstanding on [`dispose`](Scheduler::dispose).
/// Clones share one engine.
#[derive(Clone)]
pub struct Scheduler {
    pub(super) inner: Arc<Inner>,
}

impl Scheduler {
    /// Start building a scheduler.
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    /// Number of currently outstanding (armed or running) units.
    pub fn outstanding(&self) -> usize {
        self.inner.armed.lock().unwrap().len()
    }

    /// Whether disposal has begun.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

/// Fluent builder for a [`Scheduler`] and its configuration-time bindings.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    bindings: Vec<TriggerBinding>,
    sink: Arc<dyn FailureSink>,
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            bindings: Vec::new(),
            sink: Arc::new(LogSink),
        }
    }

    /// Set the scheduler tunables (default: 1 minute shutdown wait).
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Route job failures to a custom sink instead of the log.
    pub fn failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Bind a job to cron expression text, parsed at `start()`.
    pub fn bind(mut self, job: Arc<dyn Job>, expression: impl Into<String>) -> Self {
        self.bindings.push(TriggerBinding::new(
            job,
            ScheduleSource::Expression(expression.into()),
        ));
        self
    }

    /// Bind a job to an already parsed schedule.
    pub fn bind_schedule(mut self, job: Arc<dyn Job>, schedule: CronSchedule) -> Self {
        self.bindings
            .push(TriggerBinding::new(job, ScheduleSource::Parsed(schedule)));
        self
    }

    pub fn build(self) -> Scheduler {
        info!(bindings = self.bindings.len(), "scheduler built");
        Scheduler {
            inner: Arc::new(Inner {
                config: self.config,
                bindings: self.bindings,
                sink: self.sink,
                disposed: AtomicBool::new(false),
                armed: Mutex::new(HashMap::new()),
                next_unit_id: AtomicU64::new(0),
            }),
        }
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
