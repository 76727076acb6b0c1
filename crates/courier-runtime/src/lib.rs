//! courier-runtime - Event dispatch onto bound targets
//!
//! This crate provides:
//! - [`EventSource`] traits for message, data and node channels, and the
//!   in-process [`MemoryEventSource`]
//! - [`RecipientTable`] handlers and the [`DispatchRegistry`] built from a
//!   compiled binding model
//! - [`Courier`] to start and stop receiving for a target
//! - [`MainThread`] executors and reloadable logging

mod courier;
mod dispatcher;
mod executor;
mod logging;
mod memory;
mod recipients;
mod registry;
mod runtime;
mod source;

pub use courier::{Courier, CourierBuilder};
pub use dispatcher::{Dispatcher, Target};
pub use executor::{MainThread, QueuedExecutor, SerialExecutor, Task};
pub use logging::{ReloadHandle, configure_logging, init_logging, level_filter};
pub use memory::{ListenerCounts, MemoryEventSource, SentMessage};
pub use recipients::{Handler, RecipientTable};
pub use registry::{DispatchRegistry, RegistryBuilder};
pub use runtime::{AsyncRuntime, RuntimeConfig};
pub use source::{
    DataChange, DataChannel, DataEvent, DataItem, DataListener, EventSource, ListenerId,
    MessageChannel, MessageEvent, MessageListener, NodeChannel, NodeEvent, NodeListener,
    SourceError, SourceResult,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Courier, DataChannel, DispatchRegistry, EventSource, MainThread, MemoryEventSource,
        MessageChannel, NodeChannel, QueuedExecutor, RecipientTable, SerialExecutor,
    };
}
