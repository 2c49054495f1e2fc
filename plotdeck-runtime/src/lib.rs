pub mod cancel;
pub mod job;
pub mod memory;
pub mod plot;
pub mod progress;
pub mod task;
pub mod tracking;
mod worker;

pub use cancel::CancelFlag;
pub use job::{JobResult, LayerSummary, LayerTask, PlotJob};
pub use memory::{table_from_definition, InMemoryTable, SyntheticTable};
pub use plot::{build_session, BuildError, JobStatus, LayerControl, PlotSession, RedrawStatus};
pub use progress::{ChannelProgress, ProgressEvent, ProgressGuard, ProgressListener, Progresser};
pub use task::{Coordinator, TaskError, TaskHandle, TaskOutcome};
pub use tracking::{
    DataError, ProgressTrackingDataStore, RowCursor, RowSource, TrackedIter, TrackingCursor,
};
