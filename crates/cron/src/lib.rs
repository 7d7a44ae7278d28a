//! taktwerk-cron — recurring job execution on calendar cron schedules.
//!
//! Bind jobs to cron expressions at configuration time (or add them at
//! runtime via [`Scheduler::schedule`]); the engine computes each job's
//! next occurrence, runs it there, and re-arms it indefinitely. Job
//! failures are isolated to a pluggable [`FailureSink`] and never stop
//! the schedule; [`Scheduler::dispose`] shuts down with a bounded wait
//! per in-flight job.

pub mod binding;
pub mod config;
pub mod error;
pub mod job;
pub mod schedule;
pub mod scheduler;
pub mod sink;

pub use binding::{ScheduleSource, TriggerBinding};
pub use config::{load_dotenv, SchedulerConfig};
pub use error::SchedulerError;
pub use job::Job;
pub use schedule::CronSchedule;
pub use scheduler::{DrainSummary, Scheduler, SchedulerBuilder};
pub use sink::{FailureSink, LogSink};
