//! The worker side of a redraw: one pass over the rows of every layer that
//! needs fresh numbers.

use crate::cancel::CancelFlag;
use crate::progress::{ProgressListener, Progresser};
use crate::tracking::{DataError, ProgressTrackingDataStore, RowCursor, RowSource};
use plotdeck_core::zone::{Aspect, Range};
use plotdeck_core::{LayerId, ReportMap};
use std::fmt;
use std::sync::Arc;

/// Rows of one layer to summarise.
pub struct LayerTask {
    /// Style-independent identity of the layer.
    pub key: LayerId,
    pub source: Arc<dyn RowSource>,
    pub columns: (usize, usize),
    /// View window of a zone whose axes are locked; points outside it are
    /// counted as out of range.
    pub fixed_aspect: Option<Aspect>,
}

impl fmt::Debug for LayerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerTask")
            .field("table", &self.source.name())
            .field("columns", &self.columns)
            .field("fixed_aspect", &self.fixed_aspect)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub rows: u64,
    pub points: u64,
    pub blank_rows: u64,
    pub out_of_range: u64,
    pub x: Range,
    pub y: Range,
    /// Aspect `out_of_range` was counted against.
    pub aspect: Option<Aspect>,
}

impl LayerSummary {
    fn new(aspect: Option<Aspect>) -> Self {
        Self {
            rows: 0,
            points: 0,
            blank_rows: 0,
            out_of_range: 0,
            x: Range::empty(),
            y: Range::empty(),
            aspect,
        }
    }

    pub fn report(&self) -> ReportMap {
        let mut report = ReportMap::new();
        report.put("points", self.points as i64);
        report.put("blank_rows", self.blank_rows as i64);
        report.put("out_of_range", self.out_of_range as i64);
        report
    }
}

#[derive(Debug, Default)]
pub struct JobResult {
    pub summaries: Vec<(LayerId, LayerSummary)>,
}

pub struct PlotJob {
    tasks: Vec<LayerTask>,
    steps: u64,
    listener: Option<Box<dyn ProgressListener>>,
}

impl PlotJob {
    pub fn new(tasks: Vec<LayerTask>, steps: u64) -> Self {
        Self {
            tasks,
            steps,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn ProgressListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn run(self, cancel: &CancelFlag) -> Result<JobResult, DataError> {
        let mut progresser = Progresser::new(self.steps);
        if let Some(listener) = self.listener {
            progresser = progresser.with_listener(listener);
        }
        let mut result = JobResult::default();
        for task in &self.tasks {
            if cancel.is_cancelled() {
                return Err(DataError::Cancelled);
            }
            let summary = summarize(task, cancel, &mut progresser)?;
            log::debug!(
                "summarised {} rows of '{}' ({} points)",
                summary.rows,
                task.source.name(),
                summary.points
            );
            result.summaries.push((task.key.clone(), summary));
        }
        Ok(result)
    }
}

impl fmt::Debug for PlotJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotJob")
            .field("tasks", &self.tasks)
            .field("steps", &self.steps)
            .finish()
    }
}

fn summarize(
    task: &LayerTask,
    cancel: &CancelFlag,
    progresser: &mut Progresser,
) -> Result<LayerSummary, DataError> {
    let store = ProgressTrackingDataStore::new(task.source.as_ref(), cancel.clone());
    let mut cursor = store.open(progresser)?;
    let mut summary = LayerSummary::new(task.fixed_aspect);
    while cursor.advance()? {
        summary.rows += 1;
        let x = cursor.value(task.columns.0)?;
        let y = cursor.value(task.columns.1)?;
        if !(x.is_finite() && y.is_finite()) {
            summary.blank_rows += 1;
            continue;
        }
        summary.points += 1;
        summary.x.submit(x);
        summary.y.submit(y);
        if let Some(aspect) = &task.fixed_aspect {
            if !aspect.contains(x, y) {
                summary.out_of_range += 1;
            }
        }
    }
    Ok(summary)
}
