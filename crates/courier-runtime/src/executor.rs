//! Foreground executors
//!
//! Main-affinity recipients of one event are posted to a [`MainThread`] as a
//! single task, so they run together and in order relative to other events.

use courier_core::{CourierError, CourierResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Unit of work posted to the foreground
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A single serialized execution context
pub trait MainThread: Send + Sync {
    /// Queue a task; tasks run one at a time in posting order
    fn post(&self, task: Task);
}

/// Runs posted tasks on a dedicated thread
pub struct SerialExecutor {
    sender: Mutex<Option<mpsc::UnboundedSender<Task>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    name: String,
}

impl SerialExecutor {
    pub fn new(name: impl Into<String>) -> CourierResult<Self> {
        let name = name.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                while let Some(task) = receiver.blocking_recv() {
                    task();
                }
            })
            .map_err(|e| CourierError::Runtime(format!("Failed to spawn {name}: {e}")))?;

        debug!(name = %name, "serial executor started");
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            thread: Mutex::new(Some(thread)),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run everything already posted, then stop the thread
    pub fn shutdown(&self) {
        self.sender.lock().take();
        if let Some(thread) = self.thread.lock().take()
            && thread.join().is_err()
        {
            warn!(name = %self.name, "serial executor thread panicked");
        }
    }
}

impl MainThread for SerialExecutor {
    fn post(&self, task: Task) {
        let delivered = match self.sender.lock().as_ref() {
            Some(sender) => sender.send(task).is_ok(),
            None => false,
        };
        if !delivered {
            warn!(name = %self.name, "serial executor is shut down, task dropped");
        }
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SerialExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialExecutor")
            .field("name", &self.name)
            .finish()
    }
}

/// Collects posted tasks until the host drains them from its own loop
#[derive(Default)]
pub struct QueuedExecutor {
    queue: Mutex<VecDeque<Task>>,
}

impl QueuedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued tasks in order, including ones posted while draining
    ///
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.queue.lock().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl MainThread for QueuedExecutor {
    fn post(&self, task: Task) {
        self.queue.lock().push_back(task);
    }
}

impl std::fmt::Debug for QueuedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedExecutor")
            .field("pending", &self.pending())
            .finish()
    }
}
