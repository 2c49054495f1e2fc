use serde::{Deserialize, Serialize};

pub const MIN_PROGRESS_STEPS: u32 = 1;
pub const MAX_PROGRESS_STEPS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Freeze every zone's view window across redraws.
    #[serde(default)]
    pub axis_lock: bool,
    /// Number of distinct positions a progress bar moves through.
    #[serde(default = "default_progress_steps")]
    pub progress_steps: u32,
    /// Which axis of a matrix diagonal cell carries the spatial coordinate.
    #[serde(default = "default_matrix_diagonal_x")]
    pub matrix_diagonal_x: bool,
    #[serde(default = "default_worker_name_prefix")]
    pub worker_name_prefix: String,
    /// Cancel a running plot job when a newer redraw is submitted.
    #[serde(default = "default_cancel_superseded")]
    pub cancel_superseded: bool,
}

fn default_progress_steps() -> u32 {
    100
}

fn default_matrix_diagonal_x() -> bool {
    true
}

fn default_cancel_superseded() -> bool {
    true
}

fn default_worker_name_prefix() -> String {
    "plotdeck-worker".to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            axis_lock: false,
            progress_steps: default_progress_steps(),
            matrix_diagonal_x: default_matrix_diagonal_x(),
            worker_name_prefix: default_worker_name_prefix(),
            cancel_superseded: default_cancel_superseded(),
        }
    }
}

pub fn normalize_session_settings(mut settings: SessionSettings) -> SessionSettings {
    settings.progress_steps = settings
        .progress_steps
        .clamp(MIN_PROGRESS_STEPS, MAX_PROGRESS_STEPS);
    if settings.worker_name_prefix.trim().is_empty() {
        settings.worker_name_prefix = default_worker_name_prefix();
    }
    settings
}
