use log::{LevelFilter, Log, Metadata, Record};
use plotdeck_runtime::{Coordinator, TaskError, TaskOutcome};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(10);

struct CapturedLog {
    lines: Mutex<Vec<String>>,
}

impl Log for CapturedLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = format!("{} {}", record.level(), record.args());
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }

    fn flush(&self) {}
}

static CAPTURED: CapturedLog = CapturedLog {
    lines: Mutex::new(Vec::new()),
};

fn capture_logs() {
    let _ = log::set_logger(&CAPTURED);
    log::set_max_level(LevelFilter::Debug);
}

fn logged(needle: &str) -> bool {
    CAPTURED
        .lines
        .lock()
        .map(|lines| lines.iter().any(|line| line.contains(needle)))
        .unwrap_or(false)
}

/// An error whose message cannot be rendered.
struct Unprintable;

impl fmt::Display for Unprintable {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        panic!("error message could not be formatted")
    }
}

fn record<T: std::fmt::Debug>(log: &mut Vec<String>, outcome: TaskOutcome<T>) {
    log.push(format!("{outcome:?}"));
}

fn drain(coordinator: &mut Coordinator<Vec<String>>, log: &mut Vec<String>) {
    assert!(coordinator.pump_until(log, TIMEOUT, |_, c| c.in_flight() == 0));
}

#[test]
fn success_is_delivered_only_when_pumped() {
    let mut coordinator: Coordinator<Vec<String>> = Coordinator::new("test-worker");
    let mut log = Vec::new();
    let handle = coordinator.submit(|_| Ok::<_, String>(21 * 2), record::<i32>);

    thread::sleep(Duration::from_millis(50));
    assert!(log.is_empty());
    assert!(coordinator.is_pending(&handle));

    drain(&mut coordinator, &mut log);
    assert_eq!(log, vec!["Success(42)".to_string()]);
    assert!(!coordinator.is_pending(&handle));
    assert_eq!(coordinator.pump(&mut log), 0);
}

#[test]
fn cancellation_is_delivered_exactly_once() {
    let mut coordinator: Coordinator<Vec<String>> = Coordinator::new("test-worker");
    let mut log = Vec::new();
    let exited = Arc::new(AtomicBool::new(false));
    let worker_exited = Arc::clone(&exited);
    let handle = coordinator.submit(
        move |cancel| {
            let started = Instant::now();
            while !cancel.is_cancelled() && started.elapsed() < TIMEOUT {
                thread::sleep(Duration::from_millis(1));
            }
            worker_exited.store(true, Ordering::SeqCst);
            Err::<u32, _>("stopped")
        },
        record::<u32>,
    );

    handle.cancel();
    handle.cancel();
    drain(&mut coordinator, &mut log);
    assert_eq!(log, vec!["Cancelled".to_string()]);

    let started = Instant::now();
    while !exited.load(Ordering::SeqCst) && started.elapsed() < TIMEOUT {
        thread::sleep(Duration::from_millis(1));
    }
    thread::sleep(Duration::from_millis(20));
    assert_eq!(coordinator.pump(&mut log), 0);
    assert_eq!(log.len(), 1);
}

#[test]
fn errors_and_panics_become_failures() {
    capture_logs();
    let mut coordinator: Coordinator<Vec<String>> = Coordinator::new("test-worker");
    let mut log = Vec::new();
    coordinator.submit(|_| Err::<u8, _>("bad input"), record::<u8>);
    drain(&mut coordinator, &mut log);
    assert_eq!(
        log,
        vec![format!(
            "{:?}",
            TaskOutcome::<u8>::Failure(TaskError::Computation("bad input".to_string()))
        )]
    );

    log.clear();
    coordinator.submit(
        |_| -> Result<u8, String> { panic!("boom") },
        record::<u8>,
    );
    drain(&mut coordinator, &mut log);
    assert_eq!(
        log,
        vec![format!(
            "{:?}",
            TaskOutcome::<u8>::Failure(TaskError::Panicked("boom".to_string()))
        )]
    );
    assert!(logged("failed: bad input"));
    assert!(logged("panicked: boom"));
}

#[test]
fn worker_dying_before_delivery_still_reports_failure() {
    capture_logs();
    let mut coordinator: Coordinator<Vec<String>> = Coordinator::new("test-worker");
    let mut log = Vec::new();
    coordinator.submit(|_| Err::<u8, _>(Unprintable), record::<u8>);
    drain(&mut coordinator, &mut log);
    assert_eq!(
        log,
        vec![format!(
            "{:?}",
            TaskOutcome::<u8>::Failure(TaskError::Interrupted(
                "worker exited before reporting".to_string()
            ))
        )]
    );
    assert!(logged("exited without an outcome"));
}

#[test]
fn every_task_gets_one_callback() {
    let mut coordinator: Coordinator<Vec<String>> = Coordinator::new("test-worker");
    let mut log = Vec::new();
    for value in 0..8u32 {
        coordinator.submit(move |_| Ok::<_, String>(value), record::<u32>);
    }
    assert_eq!(coordinator.in_flight(), 8);
    drain(&mut coordinator, &mut log);
    log.sort();
    let expected: Vec<String> = (0..8).map(|v| format!("Success({v})")).collect();
    assert_eq!(log, expected);
}

#[test]
fn outcome_parts() {
    assert_eq!(TaskOutcome::Success(3).into_parts(), (Some(3), true));
    assert_eq!(TaskOutcome::<i32>::Cancelled.into_parts(), (None, false));
    assert!(!TaskOutcome::<i32>::Failure(TaskError::Interrupted("x".into())).is_success());
}
