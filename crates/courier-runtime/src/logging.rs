//! Process-wide logging with a reloadable level

use courier_core::{CourierError, CourierResult, LogLevel};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{Registry, reload};

/// Handle for changing the log level after initialization
pub struct ReloadHandle {
    handle: Mutex<Option<reload::Handle<LevelFilter, Registry>>>,
}

impl ReloadHandle {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// The handle used by [`init_logging`]
    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    pub fn set_handle(&self, handle: reload::Handle<LevelFilter, Registry>) {
        *self.handle.lock() = Some(handle);
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Level currently applied, if initialized
    pub fn current_level(&self) -> Option<LevelFilter> {
        self.handle.lock().as_ref()?.clone_current()
    }

    pub fn reload_level(&self, level: LogLevel) -> CourierResult<()> {
        let guard = self.handle.lock();
        let handle = guard
            .as_ref()
            .ok_or_else(|| CourierError::Config("logging is not initialized".to_string()))?;
        handle
            .reload(level_filter(level))
            .map_err(|e| CourierError::Config(format!("failed to reload log level: {e}")))
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

/// Install a formatting subscriber as the global default
///
/// Returns `false` when another subscriber was installed first; the level
/// can then not be reloaded through [`ReloadHandle::global`].
pub fn init_logging(level: LogLevel) -> bool {
    use tracing_subscriber::prelude::*;

    let (filter, handle) = reload::Layer::new(level_filter(level));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    ReloadHandle::global().set_handle(handle);
    true
}

/// Install logging at `level`, or move logging installed earlier to it
///
/// Fails when a subscriber not installed by [`init_logging`] owns the
/// global slot.
pub fn configure_logging(level: LogLevel) -> CourierResult<()> {
    if init_logging(level) {
        return Ok(());
    }
    ReloadHandle::global().reload_level(level)
}
