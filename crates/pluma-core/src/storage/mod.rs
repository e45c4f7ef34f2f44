//! # Pluma Core Storage
//!
//! Configuration persistence for the engine. The engine itself performs its
//! own source I/O through the [`SourceLoader`](crate::plugin_system::source::SourceLoader)
//! contract; this module only covers host-facing settings files.

pub mod config;
pub mod error;

pub use config::{ConfigFormat, EngineConfig, LoaderToggles};
pub use error::StorageError;
