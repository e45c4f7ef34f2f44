use std::path::Path;
use std::sync::Arc;

use crate::plugin_system::adapter::PluginMap;
use crate::plugin_system::entry::EntryPointRegistry;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;

/// Capability contract over one kind of plugin source (folder, archive, ...).
///
/// `describe` must never have side effects visible to other loaders.
/// `activate` may have them and is called at most once per candidate,
/// immediately before entry-point resolution.
pub trait SourceLoader: Send + Sync {
    /// Stable identifier, used as the loader registry key.
    fn id(&self) -> &'static str;

    /// Cheap, side-effect-free recognition test.
    fn can_handle(&self, path: &Path) -> bool;

    /// Parse the source's manifest without activating any code.
    ///
    /// Returns `Ok(None)` when no manifest is present, or when a plugin of
    /// the manifest's name is already in `plugins`. A present-but-malformed
    /// manifest is a `ManifestParse` error.
    fn describe(
        &self,
        path: &Path,
        plugins: &dyn PluginMap,
    ) -> Result<Option<PluginManifest>, PluginSystemError>;

    /// Materialize the plugin's code so its entry point becomes resolvable.
    fn activate(
        &self,
        path: &Path,
        entries: &mut EntryPointRegistry,
    ) -> Result<(), PluginSystemError>;

    /// Protocol-style prefix prepended to the path when referencing the
    /// activated plugin's resources; empty when the materialized path equals
    /// the filesystem path.
    fn access_prefix(&self) -> &str {
        ""
    }
}

/// Ordered set of registered source loaders, keyed by [`SourceLoader::id`].
///
/// Append-only during a resolution run; re-registering an id replaces the
/// instance in place. An id snapshot diff taken around plugin construction
/// detects loaders registered by the plugin itself.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: Vec<Arc<dyn SourceLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader, replacing an existing loader with the same id.
    pub fn register(&mut self, loader: Arc<dyn SourceLoader>) {
        if let Some(slot) = self.loaders.iter_mut().find(|l| l.id() == loader.id()) {
            *slot = loader;
        } else {
            self.loaders.push(loader);
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn SourceLoader>> {
        self.loaders.iter().find(|l| l.id() == id).cloned()
    }

    /// Loaders in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SourceLoader>> {
        self.loaders.iter()
    }

    /// Snapshot of registered loader ids, in order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.loaders.iter().map(|l| l.id()).collect()
    }

    pub fn count(&self) -> usize {
        self.loaders.len()
    }
}
