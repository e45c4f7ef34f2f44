//! # Pluma Core Kernel Errors
//!
//! Defines [`Error`], the umbrella error type for the application layer.
//! Subsystem errors ([`PluginSystemError`], [`StorageError`]) convert into it
//! via `#[from]`, so `?` works across subsystem boundaries.

use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageError;

/// Top-level error type for Pluma hosts.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Typed storage/config error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase:?}: {message}")]
    KernelLifecycle {
        phase: KernelLifecyclePhase,
        component_name: Option<String>,
        message: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelLifecyclePhase {
    Bootstrap,
    Initialize,
    Start,
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Helper to build a lifecycle error for a named component.
    pub fn lifecycle(
        phase: KernelLifecyclePhase,
        component_name: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Error::KernelLifecycle {
            phase,
            component_name: component_name.map(str::to_string),
            message: message.into(),
        }
    }
}
