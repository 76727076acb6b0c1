//! # courier
//!
//! Declarative routing of messages, data items and node changes from a
//! wearable event source onto plain Rust types.
//!
//! Bindings are declared per type: which fields and methods receive which
//! message or data path, the local node, or the connected node list, and on
//! which thread. The declarations are compiled into a binding model once;
//! a [`Courier`] then subscribes targets and delivers decoded payloads.
//!
//! ## Declaring bindings
//!
//! ```toml
//! [[types]]
//! name = "Screen"
//!
//! [[types.fields]]
//! name = "value"
//! ty = "i32"
//! annotations = [{ receive_messages = "/value" }]
//!
//! [[types.methods]]
//! name = "on_new_value"
//! params = ["i32"]
//! annotations = [{ receive_messages = "/value" }]
//! ```
//!
//! ## Receiving
//!
//! ```ignore
//! use courier::prelude::*;
//!
//! let model = courier::load_bindings(include_str!("bindings.toml"))?;
//! let registry = DispatchRegistry::builder(&model)
//!     .bind(
//!         "Screen",
//!         RecipientTable::new()
//!             .assign("value", |s: &Screen, v: i32| s.value.store(v, Ordering::SeqCst))
//!             .invoke("on_new_value", Screen::on_new_value),
//!     )?
//!     .build();
//!
//! let courier = Courier::builder(registry).source(source).build()?;
//! courier.start_receiving(&screen)?;
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`courier_core`] - Errors, configuration, lifecycle and node types
//! - [`courier_codec`] - Data maps, packable codecs and binary assets
//! - [`courier_compiler`] - Binding validation and the binding model
//! - [`courier_macros`] - `#[derive(Deliverable)]`
//! - [`courier_runtime`] - Event sources, dispatchers and executors

// Re-export core types
pub use courier_core::{
    CourierConfig, CourierError, CourierResult, LogLevel, Node, ReceiverState,
};

// Codec crate under a short path, for `#[courier(crate = "courier::codec")]`
pub use courier_codec as codec;
pub use courier_codec::{Blob, CodecRegistry, Packable, Packager};

// Re-export the compiler
pub use courier_compiler as compiler;
pub use courier_compiler::{BindingModel, Compilation, Diagnostic, compile};

// Re-export macros
pub use courier_macros::Deliverable;

// Re-export the runtime
pub use courier_runtime::{
    Courier, CourierBuilder, DataChannel, DispatchRegistry, EventSource, MainThread,
    MemoryEventSource, MessageChannel, NodeChannel, QueuedExecutor, RecipientTable,
    SerialExecutor, configure_logging, init_logging,
};

// Re-export common dependencies that users need
pub use async_trait::async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Compile TOML binding declarations into a binding model
///
/// Every problem is logged; the first one is returned as the error.
pub fn load_bindings(source: &str) -> CourierResult<BindingModel> {
    let decls = compiler::decl::Declarations::from_toml(source)?;
    let compilation = compile(&decls);
    match compilation.diagnostics.into_iter().next() {
        Some(first) => Err(first.into()),
        None => Ok(compilation.model),
    }
}

/// Prelude module for convenient imports.
///
/// Use `use courier::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use crate::{
        Blob, Courier, CourierConfig, CourierError, CourierResult, DataChannel, Deliverable,
        DispatchRegistry, EventSource, MainThread, MessageChannel, Node, NodeChannel, Packable,
        ReceiverState, RecipientTable, async_trait,
    };

    pub use serde::{Deserialize, Serialize};
}
