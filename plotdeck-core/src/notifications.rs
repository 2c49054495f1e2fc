use crate::config::ConfigValidationError;
use crate::styler::ErrorReporter;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub created_at: Instant,
}

impl Notification {
    fn now(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            created_at: Instant::now(),
        }
    }
}

/// User-visible messages, either global or attached to one layer control.
///
/// Messages raised while a control is active (see [`Notifications::set_active_control`])
/// are stored against that control so the shell can show them next to the
/// configuration that caused them.
#[derive(Debug, Default)]
pub struct Notifications {
    global: Vec<Notification>,
    per_control: HashMap<String, Vec<Notification>>,
    active_control: Option<String>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the control that receives context-routed messages.
    ///
    /// # Parameters
    /// - `control`: name of the layer control, or `None` to route to the global list
    pub fn set_active_control(&mut self, control: Option<&str>) {
        self.active_control = control.map(str::to_string);
    }

    pub fn active_control(&self) -> Option<&str> {
        self.active_control.as_deref()
    }

    /// Shows a message, routed to the active control if there is one.
    pub fn show_info(&mut self, title: &str, message: &str) {
        match self.active_control.clone() {
            Some(control) => self.show_control_info(&control, title, message),
            None => self.global.push(Notification::now(title, message)),
        }
    }

    pub fn show_control_info(&mut self, control: &str, title: &str, message: &str) {
        self.per_control
            .entry(control.to_string())
            .or_default()
            .push(Notification::now(title, message));
    }

    /// The most recent global messages, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&Notification> {
        self.global.iter().rev().take(limit).collect()
    }

    pub fn for_control(&self, control: &str) -> &[Notification] {
        self.per_control
            .get(control)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn global(&self) -> &[Notification] {
        &self.global
    }

    /// Number of messages across the global list and every control.
    pub fn total(&self) -> usize {
        self.global.len() + self.per_control.values().map(Vec::len).sum::<usize>()
    }

    /// Control names that currently hold at least one message, sorted.
    pub fn controls(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .per_control
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Removes messages older than `max_age` from every list.
    pub fn cleanup_older_than(&mut self, max_age: Duration) {
        let now = Instant::now();
        let fresh = |n: &Notification| now.duration_since(n.created_at) < max_age;
        self.global.retain(fresh);
        for list in self.per_control.values_mut() {
            list.retain(fresh);
        }
    }
}

impl ErrorReporter for Notifications {
    fn report_error(&mut self, error: &ConfigValidationError) {
        self.show_info(
            "Configuration error",
            &format!("Invalid value for '{}': {}", error.key, error.message),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_to_active_control() {
        let mut notes = Notifications::new();
        notes.show_info("a", "global");
        notes.set_active_control(Some("layer-1"));
        notes.show_info("b", "scoped");
        assert_eq!(notes.global().len(), 1);
        assert_eq!(notes.for_control("layer-1").len(), 1);
        assert_eq!(notes.controls(), vec!["layer-1"]);
        assert_eq!(notes.total(), 2);
    }

    #[test]
    fn cleanup_drops_everything_with_zero_age() {
        let mut notes = Notifications::new();
        notes.show_info("a", "x");
        notes.show_control_info("c", "b", "y");
        notes.cleanup_older_than(Duration::ZERO);
        assert_eq!(notes.total(), 0);
    }
}
