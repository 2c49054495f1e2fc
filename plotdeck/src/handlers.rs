use crate::commands::Commands;
use crate::output::*;
use plotdeck_core::ZoneId;
use plotdeck_runtime::{build_session, PlotSession, ProgressEvent};
use session::SessionDefinition;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn handle_command(command: Option<Commands>) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        None => print_info("No command given, try `plotdeck --help`"),
        Some(Commands::Run {
            path,
            lock_axes,
            add_zone,
            cancel_after_ms,
            timeout_seconds,
            progress,
        }) => {
            let Some(mut session) = load_session(&path) else {
                return Ok(());
            };
            if lock_axes {
                session.set_axis_lock(true);
            }
            for _ in 0..add_zone {
                match session.add_zone() {
                    Some(zone) => print_info(&format!("Added zone {zone}")),
                    None => {
                        print_error("This layout cannot take more zones");
                        break;
                    }
                }
            }
            let events = if progress {
                let (tx, rx) = mpsc::channel();
                session.set_progress_sender(tx);
                Some(rx)
            } else {
                None
            };
            run_once(
                &mut session,
                events.as_ref(),
                cancel_after_ms.map(Duration::from_millis),
                Duration::from_secs(timeout_seconds),
            );
        }
        Some(Commands::Validate { path }) => {
            let Some(session) = load_session(&path) else {
                return Ok(());
            };
            let mut failures = 0;
            for (control, result) in session.validate_layers() {
                match result {
                    Ok(style) => println!(
                        "{control}: ok ({} with {} style values)",
                        style.plotter(),
                        style.params().count()
                    ),
                    Err(err) => {
                        failures += 1;
                        print_error(&format!("{control}: {err}"));
                    }
                }
            }
            print_notifications(session.notifications());
            if failures == 0 {
                print_info(&format!("Session '{}' is valid", session.name()));
            }
        }
        Some(Commands::Zones { path }) => {
            let Some(session) = load_session(&path) else {
                return Ok(());
            };
            print_zone_layers(&zone_layers(&session));
        }
    }
    Ok(())
}

fn load_session(path: &str) -> Option<PlotSession> {
    let definition = match SessionDefinition::load_from_file(path) {
        Ok(definition) => definition,
        Err(err) => {
            print_error(&format!("Failed to load session '{path}': {err}"));
            return None;
        }
    };
    match build_session(&definition) {
        Ok(session) => Some(session),
        Err(err) => {
            print_error(&format!("Failed to build session '{}': {err}", definition.name));
            None
        }
    }
}

fn run_once(
    session: &mut PlotSession,
    events: Option<&Receiver<ProgressEvent>>,
    cancel_after: Option<Duration>,
    timeout: Duration,
) {
    match session.redraw() {
        Ok(status) => print_redraw_status(&status),
        Err(err) => {
            print_error(&format!("Redraw failed: {err}"));
            return;
        }
    }
    if !wait_for_job(session, events, cancel_after, timeout) {
        print_error(&format!(
            "Plot job did not finish within {}s",
            timeout.as_secs()
        ));
        session.cancel();
    }
    print_job_status(session.status());
    print_info("Reports:");
    for control in session.controls() {
        print_control_reports(control.name(), session.control_reports(control.name()));
    }
    print_zone_states(&session.zone_states());
    print_notifications(session.notifications());
}

fn wait_for_job(
    session: &mut PlotSession,
    events: Option<&Receiver<ProgressEvent>>,
    cancel_after: Option<Duration>,
    timeout: Duration,
) -> bool {
    let started = Instant::now();
    let mut cancelled = false;
    loop {
        session.pump();
        if let Some(events) = events {
            for event in events.try_iter() {
                print_progress(&event);
            }
        }
        if !session.is_busy() {
            return true;
        }
        if let Some(limit) = cancel_after {
            if !cancelled && started.elapsed() >= limit {
                log::info!("cancelling plot job after {}ms", limit.as_millis());
                session.cancel();
                cancelled = true;
            }
        }
        if started.elapsed() >= timeout {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn zone_layers(session: &PlotSession) -> Vec<(ZoneId, Vec<&str>)> {
    let layout = session.layout();
    let mut zones: Vec<(ZoneId, Vec<&str>)> = layout
        .zones()
        .iter()
        .map(|zone| (*zone, Vec::new()))
        .collect();
    for control in session.controls() {
        let zone = control.zone();
        match zones.iter_mut().find(|(id, _)| *id == zone) {
            Some((_, controls)) => controls.push(control.name()),
            None => zones.push((zone, vec![control.name()])),
        }
    }
    zones
}
