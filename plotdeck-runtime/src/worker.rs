use crate::task::TaskError;
use std::thread;

pub(crate) struct WorkerThread;

impl WorkerThread {
    /// Starts a detached, named worker thread.
    pub(crate) fn spawn<F>(name: String, f: F) -> Result<thread::JoinHandle<()>, TaskError>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::Builder::new()
            .name(name.clone())
            .spawn(f)
            .map_err(|err| TaskError::Spawn(format!("failed to start worker '{name}': {err}")))
    }
}
