//! Runtime configuration

use crate::LogLevel;
use serde::{Deserialize, Serialize};

/// Configuration for a courier runtime instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Number of background worker threads (default: number of CPU cores)
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Name prefix for background worker threads
    #[serde(default = "default_thread_name")]
    pub thread_name: String,

    /// Name of the thread backing the serial foreground executor
    #[serde(default = "default_main_thread_name")]
    pub main_thread_name: String,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether data items written by the local node are delivered back to
    /// local recipients (default `true`)
    #[serde(default = "default_deliver_local_data")]
    pub deliver_local_data: bool,
}

fn default_thread_name() -> String {
    "courier-worker".to_string()
}

fn default_main_thread_name() -> String {
    "courier-main".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_deliver_local_data() -> bool {
    true
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: default_thread_name(),
            main_thread_name: default_main_thread_name(),
            log_level: default_log_level(),
            deliver_local_data: default_deliver_local_data(),
        }
    }
}

impl CourierConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    ///
    /// Empty input yields the defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Create configuration from a TOML document
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Parsed form of [`CourierConfig::log_level`]
    pub fn level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level)
    }

    /// Set the number of background worker threads
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Set whether locally written data items are delivered back
    pub fn with_deliver_local_data(mut self, deliver: bool) -> Self {
        self.deliver_local_data = deliver;
        self
    }

    /// Set the initial log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
