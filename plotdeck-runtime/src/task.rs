//! Background computations whose outcome is handed back to one coordinating
//! thread.
//!
//! Work submitted through a [`Coordinator`] runs on its own worker thread.
//! The worker only sends its outcome over a channel; the callback registered
//! with the task stays on the coordinator and is invoked from
//! [`Coordinator::pump`] with mutable access to the coordinator's state.
//! Every task gets exactly one callback: the value on success, or
//! [`TaskOutcome::Failure`] / [`TaskOutcome::Cancelled`] otherwise.

use crate::cancel::CancelFlag;
use crate::worker::WorkerThread;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("computation failed: {0}")]
    Computation(String),
    #[error("computation panicked: {0}")]
    Panicked(String),
    #[error("interrupted while waiting for the result: {0}")]
    Interrupted(String),
    #[error("{0}")]
    Spawn(String),
}

#[derive(Debug)]
pub enum TaskOutcome<T> {
    Success(T),
    Failure(TaskError),
    Cancelled,
}

impl<T> TaskOutcome<T> {
    /// The value and success flag; `(None, false)` for anything but success.
    pub fn into_parts(self) -> (Option<T>, bool) {
        match self {
            TaskOutcome::Success(value) => (Some(value), true),
            TaskOutcome::Failure(_) | TaskOutcome::Cancelled => (None, false),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }
}

type AnyValue = Box<dyn Any + Send>;
type Callback<S> = Box<dyn FnOnce(&mut S, TaskOutcome<AnyValue>)>;

impl TaskOutcome<AnyValue> {
    fn downcast<T: 'static>(self) -> TaskOutcome<T> {
        match self {
            TaskOutcome::Success(value) => match value.downcast::<T>() {
                Ok(value) => TaskOutcome::Success(*value),
                Err(_) => TaskOutcome::Failure(TaskError::Computation(
                    "result has an unexpected type".to_string(),
                )),
            },
            TaskOutcome::Failure(err) => TaskOutcome::Failure(err),
            TaskOutcome::Cancelled => TaskOutcome::Cancelled,
        }
    }
}

enum Message {
    Finished {
        task: u64,
        outcome: TaskOutcome<AnyValue>,
    },
    CancelRequested {
        task: u64,
    },
}

struct Pending<S> {
    callback: Callback<S>,
    flag: CancelFlag,
}

/// Handle to a submitted task.
#[derive(Clone)]
pub struct TaskHandle {
    id: u64,
    flag: CancelFlag,
    sender: Sender<Message>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Requests cancellation. Safe to call from any thread and more than
    /// once; if the outcome has not been delivered yet it will be
    /// [`TaskOutcome::Cancelled`].
    pub fn cancel(&self) {
        self.flag.cancel();
        let _ = self.sender.send(Message::CancelRequested { task: self.id });
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("cancelled", &self.flag.is_cancelled())
            .finish()
    }
}

/// Sends a failure if the worker exits without having delivered.
struct DeliveryGuard {
    task: u64,
    sender: Option<Sender<Message>>,
}

impl DeliveryGuard {
    fn deliver(&mut self, outcome: TaskOutcome<AnyValue>) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Message::Finished {
                task: self.task,
                outcome,
            });
        }
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        if self.sender.is_some() {
            log::warn!("worker for task {} exited without an outcome", self.task);
            self.deliver(TaskOutcome::Failure(TaskError::Interrupted(
                "worker exited before reporting".to_string(),
            )));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Owns the callbacks of in-flight tasks and delivers their outcomes to a
/// state of type `S`. Not `Send`: it lives on the coordinating thread.
pub struct Coordinator<S> {
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    pending: HashMap<u64, Pending<S>>,
    next_id: u64,
    worker_prefix: String,
}

impl<S: 'static> Default for Coordinator<S> {
    fn default() -> Self {
        Self::new("plotdeck-worker")
    }
}

impl<S: 'static> Coordinator<S> {
    pub fn new(worker_prefix: &str) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            pending: HashMap::new(),
            next_id: 1,
            worker_prefix: worker_prefix.to_string(),
        }
    }

    /// Runs `computation` on a worker thread. `callback` is invoked once, on
    /// the thread that pumps this coordinator.
    ///
    /// The computation receives the task's cancellation flag and should poll
    /// it. An `Err` returned after cancellation counts as cancellation, not
    /// failure.
    pub fn submit<T, E, F, C>(&mut self, computation: F, callback: C) -> TaskHandle
    where
        T: Send + 'static,
        E: fmt::Display,
        F: FnOnce(&CancelFlag) -> Result<T, E> + Send + 'static,
        C: FnOnce(&mut S, TaskOutcome<T>) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        let flag = CancelFlag::new();
        self.pending.insert(
            id,
            Pending {
                callback: Box::new(move |state, outcome| callback(state, outcome.downcast::<T>())),
                flag: flag.clone(),
            },
        );

        let worker_flag = flag.clone();
        let sender = self.sender.clone();
        let spawned = WorkerThread::spawn(format!("{}-{id}", self.worker_prefix), move || {
            let mut guard = DeliveryGuard {
                task: id,
                sender: Some(sender),
            };
            let result = panic::catch_unwind(AssertUnwindSafe(|| computation(&worker_flag)));
            let outcome = match result {
                _ if worker_flag.is_cancelled() => TaskOutcome::Cancelled,
                Ok(Ok(value)) => TaskOutcome::Success(Box::new(value) as AnyValue),
                Ok(Err(err)) => {
                    log::error!("task {id} failed: {err}");
                    TaskOutcome::Failure(TaskError::Computation(err.to_string()))
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log::error!("task {id} panicked: {message}");
                    TaskOutcome::Failure(TaskError::Panicked(message))
                }
            };
            guard.deliver(outcome);
        });
        if let Err(err) = spawned {
            log::error!("task {id} could not start: {err}");
            let _ = self.sender.send(Message::Finished {
                task: id,
                outcome: TaskOutcome::Failure(err),
            });
        }

        TaskHandle {
            id,
            flag,
            sender: self.sender.clone(),
        }
    }

    /// Number of tasks whose outcome has not been delivered yet.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: &TaskHandle) -> bool {
        self.pending.contains_key(&handle.id)
    }

    fn dispatch(&mut self, state: &mut S, message: Message) -> bool {
        let (task, outcome) = match message {
            Message::CancelRequested { task } => (task, TaskOutcome::Cancelled),
            Message::Finished { task, outcome } => (task, outcome),
        };
        let Some(pending) = self.pending.remove(&task) else {
            return false;
        };
        let outcome = if pending.flag.is_cancelled() {
            TaskOutcome::Cancelled
        } else {
            outcome
        };
        (pending.callback)(state, outcome);
        true
    }

    /// Delivers every outcome that has arrived, without blocking. Returns the
    /// number of callbacks invoked.
    pub fn pump(&mut self, state: &mut S) -> usize {
        let mut delivered = 0;
        while let Ok(message) = self.receiver.try_recv() {
            if self.dispatch(state, message) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Like [`Coordinator::pump`], but waits up to `timeout` for the first
    /// message when none is queued.
    pub fn wait_and_pump(&mut self, state: &mut S, timeout: Duration) -> usize {
        let mut delivered = 0;
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => {
                if self.dispatch(state, message) {
                    delivered += 1;
                }
            }
            Err(RecvTimeoutError::Timeout) => return 0,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("task channel disconnected");
                return 0;
            }
        }
        delivered + self.pump(state)
    }

    /// Pumps until `done` holds or `timeout` elapses. Returns whether `done`
    /// was reached.
    pub fn pump_until(
        &mut self,
        state: &mut S,
        timeout: Duration,
        mut done: impl FnMut(&S, &Self) -> bool,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump(state);
            if done(state, self) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait_and_pump(state, deadline - now);
        }
    }
}

impl<S> fmt::Debug for Coordinator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("in_flight", &self.pending.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
