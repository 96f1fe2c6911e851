//! Error types for ZoneSnap.
//!
//! This module provides the unified error type returned by engine operations
//! and CLI commands.

use thiserror::Error;

use crate::config::ConfigError;
use crate::platform::{NativeError, WindowHandle};

/// Errors that can occur while running the zone engine.
#[derive(Debug, Error)]
pub enum ZoneSnapError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A layout name that is not configured.
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    /// A monitor id that is not currently detected.
    #[error("Unknown monitor: {0}")]
    UnknownMonitor(u32),

    /// A zone name that does not exist on the given monitor.
    #[error("Unknown zone '{zone}' on monitor {monitor}")]
    UnknownZone { monitor: u32, zone: String },

    /// No monitor could be resolved for a zone key without an explicit monitor key.
    #[error("No target monitor could be resolved")]
    NoTargetMonitor,

    /// Restore was requested for a window that was never snapped.
    #[error("No saved state for window {0}")]
    NoSavedState(WindowHandle),

    /// An operation needed a foreground window and there is none.
    #[error("No active window")]
    NoActiveWindow,

    /// A native window-manipulation primitive failed.
    #[error("Native error: {0}")]
    Native(#[from] NativeError),

    /// The engine was started twice.
    #[error("Engine is already running")]
    AlreadyRunning,

    /// The event listener is not running or has stopped.
    #[error("Event listener channel closed")]
    EventChannelClosed,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error outside configuration loading.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
}

impl ZoneSnapError {
    /// Returns true for errors that name a layout, monitor or zone that does
    /// not exist. Such errors leave all state unchanged.
    #[must_use]
    pub const fn is_unknown_target(&self) -> bool {
        matches!(
            self,
            Self::UnknownLayout(_)
                | Self::UnknownMonitor(_)
                | Self::UnknownZone { .. }
                | Self::NoTargetMonitor
        )
    }

    /// Returns the handle if the error was caused by a destroyed window.
    #[must_use]
    pub const fn stale_handle(&self) -> Option<WindowHandle> {
        match self {
            Self::Native(err) => err.stale_handle(),
            _ => None,
        }
    }
}
