//! # Pluma Core Plugin System
//!
//! Infrastructure for discovering and activating plugins from heterogeneous
//! sources (folders, single-file archives, compressed containers), resolving
//! inter-plugin dependencies before activation.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`adapter`]**: The narrow [`PluginMap`](adapter::PluginMap) surface
//!   through which the engine and source loaders see the host's live plugin
//!   map.
//! - **[`entry`]**: The entry-point registry mapping manifest `main` symbols
//!   to host-registered compiled units.
//! - **[`error`]**: The [`PluginSystemError`](error::PluginSystemError)
//!   taxonomy; recoverable per-candidate failures versus fatal load failures.
//! - **[`graylist`]**: Allow/deny policy on plugin names.
//! - **[`loader`]**: The dependency-aware load engine: triage, the
//!   fixed-point resolution loop, and activation.
//! - **[`manager`]**: The async [`PluginManager`] component wrapping the
//!   engine for the kernel lifecycle.
//! - **[`manifest`]**: Plugin metadata ([`PluginManifest`]) parsed from
//!   `plugin.yml`.
//! - **[`permissions`]**: Process-wide permission registry with default-grant
//!   tiers.
//! - **[`registry`]**: The canonical map of activated plugins
//!   ([`PluginRegistry`]).
//! - **[`source`]**: The [`SourceLoader`](source::SourceLoader) capability
//!   contract, the loader registry, and the reference source implementations
//!   under [`sources`].
//! - **[`traits`]**: The [`Plugin`] handle trait and the activation context.
//! - **[`triage`]**: The per-call candidate working set and its dependency
//!   edges.
//! - **[`version`]**: API version and constraint-range parsing.

pub mod adapter;
pub mod entry;
pub mod error;
pub mod graylist;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod permissions;
pub mod registry;
pub mod source;
pub mod sources;
pub mod traits;
pub mod triage;
pub mod version;

pub use adapter::PluginMap;
pub use graylist::{GraylistMode, PluginGraylist};
pub use loader::PluginLoader;
pub use manager::{DefaultPluginManager, LoadReport, PluginManager};
pub use manifest::{ManifestBuilder, PluginManifest};
pub use registry::PluginRegistry;
pub use source::{LoaderRegistry, SourceLoader};
pub use traits::{Plugin, PluginContext};
pub use version::{ApiVersion, VersionRange};

// Test module declaration
#[cfg(test)]
mod tests;
