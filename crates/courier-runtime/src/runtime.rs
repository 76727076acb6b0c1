//! Background runtime for event-source work

use courier_core::{CourierConfig, CourierError, CourierResult};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};

/// Thread settings of an owned background runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Defaults to tokio's choice, one per core
    pub worker_threads: Option<usize>,
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "courier-worker".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

impl From<&CourierConfig> for RuntimeConfig {
    fn from(config: &CourierConfig) -> Self {
        Self {
            worker_threads: config.worker_threads,
            thread_name: config.thread_name.clone(),
        }
    }
}

/// Tokio runtime that runs subscriptions, enumeration and replay
///
/// Either owns a multi-thread runtime or borrows the handle of one the host
/// already runs.
pub struct AsyncRuntime {
    runtime: Option<Arc<Runtime>>,
    handle: Handle,
}

impl AsyncRuntime {
    pub fn new(config: RuntimeConfig) -> CourierResult<Self> {
        let mut builder = Builder::new_multi_thread();

        if let Some(threads) = config.worker_threads {
            builder.worker_threads(threads);
        }

        let runtime = builder
            .thread_name(&config.thread_name)
            .enable_all()
            .build()
            .map_err(|e| CourierError::Runtime(format!("cannot start background runtime: {e}")))?;
        let handle = runtime.handle().clone();

        Ok(Self {
            runtime: Some(Arc::new(runtime)),
            handle,
        })
    }

    pub fn with_defaults() -> CourierResult<Self> {
        Self::new(RuntimeConfig::default())
    }

    /// Run on a runtime owned by the host
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            runtime: None,
            handle,
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn owns_runtime(&self) -> bool {
        self.runtime.is_some()
    }

    /// Block on a future from a sync context
    ///
    /// Must not be called from inside the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        match &self.runtime {
            Some(runtime) => runtime.block_on(future),
            None => self.handle.block_on(future),
        }
    }

    pub fn spawn<F>(&self, future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

impl std::fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("owns_runtime", &self.owns_runtime())
            .finish()
    }
}
