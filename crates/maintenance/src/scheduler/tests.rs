//! Tests for the scheduler module.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::schedule::MaintenanceSchedule;
use crate::testing::VirtualClock;

use super::{CronJob, CronScheduler, JobFuture, SchedulerError};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn every_minute() -> MaintenanceSchedule {
    MaintenanceSchedule::parse("* * * * *").unwrap()
}

/// Job that records the clock reading at every fire.
fn recording_job(clock: Arc<VirtualClock>) -> (CronJob, Arc<Mutex<Vec<DateTime<Utc>>>>) {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = fired.clone();
    let job: CronJob = Arc::new(move || -> JobFuture {
        let clock = clock.clone();
        let sink = sink.clone();
        Box::pin(async move {
            sink.lock().unwrap().push(clock.now());
        })
    });
    (job, fired)
}

/// Job that runs for `length` of (virtual) time.
fn slow_job(length: Duration, started: Arc<AtomicUsize>, done: Arc<AtomicBool>) -> CronJob {
    Arc::new(move || -> JobFuture {
        let started = started.clone();
        let done = done.clone();
        Box::pin(async move {
            started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(length).await;
            done.store(true, Ordering::SeqCst);
        })
    })
}

// -- firing ----------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn fires_on_each_occurrence() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:30Z")));
    let scheduler = CronScheduler::new(clock.clone());
    let (job, fired) = recording_job(clock.clone());
    scheduler.schedule("every-minute", every_minute(), job);

    scheduler.start().unwrap();
    tokio::time::sleep(Duration::from_secs(140)).await;

    let fired = fired.lock().unwrap().clone();
    assert_eq!(
        fired,
        vec![at("2024-01-01T00:01:00Z"), at("2024-01-01T00:02:00Z")]
    );
    scheduler.stop(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn does_not_fire_before_start() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:30Z")));
    let scheduler = CronScheduler::new(clock.clone());
    let (job, fired) = recording_job(clock.clone());
    scheduler.schedule("every-minute", every_minute(), job);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(fired.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn entries_fire_independently() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:30Z")));
    let scheduler = CronScheduler::new(clock.clone());

    // Blocks its own entry for ten minutes.
    let started = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicBool::new(false));
    scheduler.schedule(
        "slow",
        every_minute(),
        slow_job(Duration::from_secs(600), started.clone(), done),
    );
    let (job, fired) = recording_job(clock.clone());
    scheduler.schedule("fast", every_minute(), job);

    scheduler.start().unwrap();
    tokio::time::sleep(Duration::from_secs(200)).await;

    assert_eq!(started.load(Ordering::SeqCst), 1, "slow entry must not overlap itself");
    assert_eq!(fired.lock().unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn entry_added_while_running_starts_immediately() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:30Z")));
    let scheduler = CronScheduler::new(clock.clone());
    scheduler.start().unwrap();
    assert!(scheduler.is_running());

    let (job, fired) = recording_job(clock.clone());
    scheduler.schedule("late", every_minute(), job);
    tokio::time::sleep(Duration::from_secs(40)).await;

    assert_eq!(*fired.lock().unwrap(), vec![at("2024-01-01T00:01:00Z")]);
}

#[tokio::test(start_paused = true)]
async fn next_for_reports_upcoming_occurrence() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:30Z")));
    let scheduler = CronScheduler::new(clock.clone());
    let (job, _) = recording_job(clock.clone());
    let id = scheduler.schedule(
        "hourly",
        MaintenanceSchedule::parse("@hourly").unwrap(),
        job,
    );

    assert_eq!(scheduler.len(), 1);
    assert_eq!(scheduler.entry(id).unwrap().name, "hourly");
    assert_eq!(
        scheduler.next_for(id, clock.now()),
        Some(at("2024-01-01T01:00:00Z"))
    );
}

// -- lifecycle -------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn second_start_is_rejected() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:00Z")));
    let scheduler = CronScheduler::new(clock);
    scheduler.start().unwrap();
    assert_eq!(scheduler.start(), Err(SchedulerError::AlreadyRunning));

    scheduler.stop(Duration::from_secs(1)).await.unwrap();
    assert_eq!(scheduler.start(), Err(SchedulerError::Stopped));
    assert!(!scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_fires() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:30Z")));
    let scheduler = CronScheduler::new(clock.clone());
    let (job, fired) = recording_job(clock.clone());
    scheduler.schedule("every-minute", every_minute(), job);

    scheduler.start().unwrap();
    tokio::time::sleep(Duration::from_secs(40)).await;
    scheduler.stop(Duration::from_secs(1)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(300)).await;

    assert_eq!(fired.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_waits_for_in_flight_job() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:59Z")));
    let scheduler = CronScheduler::new(clock.clone());
    let started = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicBool::new(false));
    scheduler.schedule(
        "slow",
        every_minute(),
        slow_job(Duration::from_secs(5), started.clone(), done.clone()),
    );

    scheduler.start().unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(started.load(Ordering::SeqCst), 1);
    assert!(!done.load(Ordering::SeqCst));

    scheduler.stop(Duration::from_secs(10)).await.unwrap();
    assert!(done.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn stop_times_out_on_long_job() {
    let clock = Arc::new(VirtualClock::starting_at(at("2024-01-01T00:00:59Z")));
    let scheduler = CronScheduler::new(clock.clone());
    let started = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicBool::new(false));
    scheduler.schedule(
        "slow",
        every_minute(),
        slow_job(Duration::from_secs(60), started.clone(), done.clone()),
    );

    scheduler.start().unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let err = scheduler.stop(Duration::from_secs(1)).await.unwrap_err();
    assert_eq!(err, SchedulerError::StopTimeout(Duration::from_secs(1)));
    assert!(!done.load(Ordering::SeqCst));
}
