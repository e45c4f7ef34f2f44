//! # Pluma Core Plugin System Errors
//!
//! [`PluginSystemError`] covers every failure the load engine can report.
//! Most variants are recoverable: the offending candidate is skipped, the
//! caller-visible error counter is incremented, and the load continues.
//! Only [`ReentrantLoad`](PluginSystemError::ReentrantLoad) and
//! [`GraylistParse`](PluginSystemError::GraylistParse) are fatal to the
//! whole operation.

use std::path::PathBuf;

use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Invalid manifest at '{path}': {message}", path = .path.display())]
    ManifestParse {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Duplicate plugin '{name}'; a plugin of that name was already found or loaded")]
    DuplicatePlugin { name: String },

    #[error("Plugin '{name}' is not compatible with host API {host_api}: requires {required}")]
    ApiIncompatible {
        name: String,
        host_api: String,
        required: String,
    },

    #[error("Unknown dependencies for plugin '{name}': {missing}")]
    UnknownDependency { name: String, missing: String },

    #[error("Circular dependency detected involving plugin '{name}'")]
    CircularDependency { name: String },

    #[error("Entry point '{main}' for plugin '{name}' could not be resolved")]
    MainEntryNotFound { name: String, main: String },

    #[error("Entry point '{main}' for plugin '{name}' does not conform to the plugin interface")]
    MainEntryWrongType { name: String, main: String },

    #[error("Entry point '{main}' for plugin '{name}' is abstract and cannot be instantiated")]
    MainEntryNotInstantiable { name: String, main: String },

    #[error("Data folder '{path}' for plugin '{name}' exists and is not a directory", path = .path.display())]
    DataFolderConflict { name: String, path: PathBuf },

    #[error("Plugin '{name}' declares permission '{permission}' which is already registered")]
    DuplicatePermission { name: String, permission: String },

    /// Source-specific failure while describing or materializing a candidate.
    #[error("Source error for '{path}': {message}", path = .path.display())]
    Source {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O failure during '{operation}' on '{path}': {source}", path = .path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Fatal: `load_plugins` called while a load is already in progress.
    #[error("Plugin loading cannot be invoked from within itself")]
    ReentrantLoad,

    /// Fatal: the graylist policy file could not be parsed, so no load may
    /// proceed under an assumed policy.
    #[error("Failed to load graylist '{path}': {message}", path = .path.display())]
    GraylistParse { path: PathBuf, message: String },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),

    #[error("Internal plugin system error: {0}")]
    Internal(String),
}

impl PluginSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        PluginSystemError::Io {
            path,
            operation: operation.into(),
            source,
        }
    }
}
