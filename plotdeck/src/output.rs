use plotdeck_core::notifications::Notification;
use plotdeck_core::zone::AxisState;
use plotdeck_core::{ControlReports, Notifications, ReportMap, ZoneId};
use plotdeck_runtime::{JobStatus, ProgressEvent, RedrawStatus};

pub fn print_info(message: &str) {
    println!("[PlotDeck][INFO] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[PlotDeck][ERROR]: {message}");
}

pub fn print_redraw_status(status: &RedrawStatus) {
    match status {
        RedrawStatus::Submitted { layers, computed } => {
            print_info(&format!("Plot job started for {computed} of {layers} layers"))
        }
        RedrawStatus::Cached { layers } => {
            print_info(&format!("All {layers} layers drawn from cache"))
        }
        RedrawStatus::Unchanged => print_info("Nothing to redraw"),
    }
}

pub fn print_job_status(status: &JobStatus) {
    match status {
        JobStatus::Idle => print_info("No plot job has run"),
        JobStatus::Running => print_info("Plot job still running"),
        JobStatus::Completed { layers, computed } => print_info(&format!(
            "Plot complete: {layers} layers, {computed} computed"
        )),
        JobStatus::Cancelled => print_info("Plot job cancelled"),
        JobStatus::Failed(message) => print_error(&format!("Plot job failed: {message}")),
    }
}

pub fn print_progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::Started { total: Some(total) } => println!("progress: started ({total} rows)"),
        ProgressEvent::Started { total: None } => println!("progress: started"),
        ProgressEvent::Position {
            count,
            position,
            steps,
        } => println!("progress: {position}/{steps} ({count} rows)"),
        ProgressEvent::Reset => println!("progress: done"),
    }
}

fn print_report_map(indent: &str, reports: &ReportMap) {
    for (name, value) in reports.iter() {
        println!("{indent}{name}: {value}");
    }
}

pub fn print_control_reports(control: &str, reports: Option<&ControlReports>) {
    println!("{control}:");
    let Some(reports) = reports else {
        println!("\t(no reports)");
        return;
    };
    if reports.common.is_empty() && reports.per_subset.is_empty() {
        println!("\t(no reports)");
        return;
    }
    print_report_map("\t", &reports.common);
    for (subset, map) in &reports.per_subset {
        println!("\t[{subset}]");
        print_report_map("\t\t", map);
    }
}

pub fn print_zone_states(states: &[(ZoneId, &AxisState)]) {
    print_info("Zones:");
    for (zone, state) in states {
        match state.aspect() {
            Some(aspect) => println!(
                "{zone} ({}) x=[{}, {}] y=[{}, {}]",
                state.name(),
                aspect.x.0,
                aspect.x.1,
                aspect.y.0,
                aspect.y.1
            ),
            None => println!("{zone} ({})", state.name()),
        }
    }
}

pub fn print_zone_layers(zones: &[(ZoneId, Vec<&str>)]) {
    print_info("Zone layout:");
    for (zone, controls) in zones {
        if controls.is_empty() {
            println!("{zone}: (empty)");
        } else {
            println!("{zone}: {}", controls.join(", "));
        }
    }
}

fn print_notification(indent: &str, notification: &Notification) {
    println!("{indent}{}: {}", notification.title, notification.message);
}

pub fn print_notifications(notifications: &Notifications) {
    if notifications.total() == 0 {
        return;
    }
    print_info("Notifications:");
    for notification in notifications.global() {
        print_notification("", notification);
    }
    for control in notifications.controls() {
        println!("{control}:");
        for notification in notifications.for_control(control) {
            print_notification("\t", notification);
        }
    }
}
