//! Sequential row access, and wrappers that advance a [`Progresser`] and
//! observe cancellation as rows are consumed.

use crate::cancel::CancelFlag;
use crate::progress::{ProgressGuard, Progresser};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },
    #[error("column {column} out of range for a row of {width} values")]
    ColumnOutOfRange { column: usize, width: usize },
    #[error("row iteration cancelled")]
    Cancelled,
}

/// Forward-only cursor over the rows of a table.
pub trait RowCursor {
    /// Moves to the next row; `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool, DataError>;

    /// Value of `column` in the current row.
    fn value(&self, column: usize) -> Result<f64, DataError>;
}

/// A table that can be read sequentially any number of times.
pub trait RowSource: Send + Sync {
    fn name(&self) -> &str;

    /// Row count if it is known without reading the rows.
    fn row_count(&self) -> Option<u64>;

    fn columns(&self) -> &[String];

    fn column_index(&self, name: &str) -> Result<usize, DataError> {
        self.columns()
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| DataError::UnknownColumn {
                table: self.name().to_string(),
                column: name.to_string(),
            })
    }

    fn open(&self) -> Result<Box<dyn RowCursor + '_>, DataError>;
}

/// A row source whose cursors report progress and honour a cancel flag.
pub struct ProgressTrackingDataStore<'a> {
    source: &'a dyn RowSource,
    cancel: CancelFlag,
}

impl<'a> ProgressTrackingDataStore<'a> {
    pub fn new(source: &'a dyn RowSource, cancel: CancelFlag) -> Self {
        Self { source, cancel }
    }

    pub fn source(&self) -> &dyn RowSource {
        self.source
    }

    /// Opens a cursor; the progresser is initialised from the source's row
    /// count and reset when the cursor is dropped.
    pub fn open<'p>(
        &self,
        progresser: &'p mut Progresser,
    ) -> Result<TrackingCursor<'a, 'p>, DataError> {
        let inner = self.source.open()?;
        Ok(TrackingCursor {
            inner,
            progress: progresser.track(self.source.row_count()),
            cancel: self.cancel.clone(),
        })
    }
}

pub struct TrackingCursor<'a, 'p> {
    inner: Box<dyn RowCursor + 'a>,
    progress: ProgressGuard<'p>,
    cancel: CancelFlag,
}

impl TrackingCursor<'_, '_> {
    /// Rows consumed so far.
    pub fn count(&self) -> u64 {
        self.progress.count()
    }
}

impl RowCursor for TrackingCursor<'_, '_> {
    fn advance(&mut self) -> Result<bool, DataError> {
        if self.cancel.is_cancelled() {
            return Err(DataError::Cancelled);
        }
        let more = self.inner.advance()?;
        if more {
            self.progress.increment();
        }
        Ok(more)
    }

    fn value(&self, column: usize) -> Result<f64, DataError> {
        self.inner.value(column)
    }
}

/// Iterator adapter that advances a progresser per item. The total comes
/// from the iterator's size hint when that is exact.
pub struct TrackedIter<'p, I> {
    inner: I,
    progress: ProgressGuard<'p>,
    cancel: Option<CancelFlag>,
    cancelled: bool,
}

impl<'p, I: Iterator> TrackedIter<'p, I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>, progresser: &'p mut Progresser) -> Self {
        let inner = iter.into_iter();
        let total = match inner.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower as u64),
            _ => None,
        };
        Self {
            inner,
            progress: progresser.track(total),
            cancel: None,
            cancelled: false,
        }
    }

    /// Stops yielding items once `cancel` is set.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Items yielded so far.
    pub fn consumed(&self) -> u64 {
        self.progress.count()
    }
}

impl<I: Iterator> Iterator for TrackedIter<'_, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            self.cancelled = true;
            return None;
        }
        let item = self.inner.next()?;
        self.progress.increment();
        Some(item)
    }
}
