//! The self-rescheduling execution engine.
//!
//! At most one rescheduling unit exists per binding at any instant: the
//! unit sleeps until its next occurrence, runs the job with failures
//! isolated to the failure sink, then re-arms itself relative to its own
//! start timestamp. [`Scheduler::dispose`] cancels every unit that has
//! not started and bounded-waits every unit in flight.

mod arming;
mod core;
mod dispose;
mod firing;


pub use self::core::{Scheduler, SchedulerBuilder};
pub use self::dispose::DrainSummary;
