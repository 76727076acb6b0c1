//! courier-core - Core types shared by the courier compiler and runtime
//!
//! This crate provides the foundational types:
//! - [`CourierError`] for the error taxonomy
//! - [`CourierConfig`] for runtime configuration
//! - [`ReceiverState`] for the per-target receiving lifecycle
//! - [`Node`] for peer identity

mod config;
mod error;
mod lifecycle;
mod node;

pub use config::CourierConfig;
pub use error::{CourierError, CourierResult};
pub use lifecycle::ReceiverState;
pub use node::Node;

/// Log levels understood by the courier logging setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Parse a level name as used in configuration files (case-insensitive)
    ///
    /// Unknown names fall back to [`LogLevel::Info`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "off" | "none" => LogLevel::Off,
            _ => LogLevel::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{CourierConfig, CourierError, CourierResult, LogLevel, Node, ReceiverState};
}
