//! End-to-end scenarios against the public API.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use taktwerk_cron::{CronSchedule, Job, Scheduler, SchedulerConfig};

/// Job that flips a shared flag and counts runs.
struct FlagJob {
    name: &'static str,
    flag: Arc<AtomicBool>,
    runs: Arc<AtomicUsize>,
}

impl FlagJob {
    fn new(name: &'static str) -> (Arc<Self>, Arc<AtomicBool>, Arc<AtomicUsize>) {
        let flag = Arc::new(AtomicBool::new(false));
        let runs = Arc::new(AtomicUsize::new(0));
        let job = Arc::new(Self {
            name,
            flag: flag.clone(),
            runs: runs.clone(),
        });
        (job, flag, runs)
    }
}

#[async_trait]
impl Job for FlagJob {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self) -> anyhow::Result<()> {
        self.flag.store(true, Ordering::SeqCst);
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn every_second_binding_sets_flag_within_two_seconds() {
    let (job, flag, _) = FlagJob::new("flag");
    let scheduler = Scheduler::builder()
        .config(SchedulerConfig {
            shutdown_timeout: Duration::from_secs(5),
        })
        .bind(job, "0/1 * * * * ?")
        .build();
    scheduler.start().unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(flag.load(Ordering::SeqCst), "flag was never set");

    scheduler.dispose().await;
}

#[tokio::test]
async fn past_year_binding_is_skipped_without_error() {
    let (job, flag, _) = FlagJob::new("past");
    let scheduler = Scheduler::builder().bind(job, "0 0 10 * * ? 1900").build();

    scheduler.start().expect("past-year schedule must not fail start");
    assert_eq!(scheduler.outstanding(), 0);
    assert!(!flag.load(Ordering::SeqCst));
}

#[tokio::test]
async fn full_lifecycle_with_runtime_job() {
    let (bound, _, bound_runs) = FlagJob::new("bound");
    let (late, _, late_runs) = FlagJob::new("late");

    let scheduler = Scheduler::builder()
        .config(SchedulerConfig {
            shutdown_timeout: Duration::from_secs(5),
        })
        .bind_schedule(bound, CronSchedule::parse("* * * * * ?").unwrap())
        .build();
    scheduler.start().unwrap();
    scheduler.schedule(late, "* * * * * ?").unwrap();

    tokio::time::sleep(Duration::from_millis(2_200)).await;
    let summary = scheduler.dispose().await;

    let bound_total = bound_runs.load(Ordering::SeqCst);
    let late_total = late_runs.load(Ordering::SeqCst);
    assert!(bound_total >= 1);
    assert!(late_total >= 1);
    assert_eq!(summary.timed_out, 0);
    assert_eq!(summary.failed, 0);

    // Nothing fires once the drain has returned.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(bound_runs.load(Ordering::SeqCst), bound_total);
    assert_eq!(late_runs.load(Ordering::SeqCst), late_total);
    assert_eq!(scheduler.outstanding(), 0);
}
