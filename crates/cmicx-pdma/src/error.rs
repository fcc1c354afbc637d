//! Error types for packet DMA HAL operations
//!
//! Register access and every per-channel operation are infallible. Errors
//! only surface while building a device context, selecting the operation
//! table, or mapping a register window.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for HAL operations
pub type Result<T> = std::result::Result<T, PdmaError>;

/// Errors that can occur while setting up the packet DMA HAL
#[derive(Debug, Error)]
pub enum PdmaError {
    /// Device context or configuration is unusable
    #[error("Invalid parameter: {reason}")]
    InvalidParam {
        /// What was wrong
        reason: String,
    },

    /// Group index outside the device topology
    #[error("Group {group} out of range (device has {count} groups)")]
    InvalidGroup {
        /// Requested group
        group: usize,
        /// Number of groups on the device
        count: usize,
    },

    /// Channel index outside the device topology
    #[error("Channel {chan} out of range (device has {count} channels)")]
    InvalidChannel {
        /// Requested flat channel index
        chan: usize,
        /// Number of channels on the device
        count: usize,
    },

    /// Register window file not found
    #[error("Register window not found: {path}")]
    WindowNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// I/O error while opening a register window
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Mapping the register window failed
    #[error("Failed to map register window: {reason}")]
    MapFailed {
        /// Reason for failure
        reason: String,
    },
}

impl PdmaError {
    /// Create an invalid parameter error
    pub fn invalid_param(reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            reason: reason.into(),
        }
    }

    /// Create a register window not found error
    pub fn window_not_found(path: impl Into<PathBuf>) -> Self {
        Self::WindowNotFound { path: path.into() }
    }

    /// Create a map failed error
    pub fn map_failed(reason: impl Into<String>) -> Self {
        Self::MapFailed {
            reason: reason.into(),
        }
    }
}
