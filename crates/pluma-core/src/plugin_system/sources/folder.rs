use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::trace;

use crate::plugin_system::adapter::PluginMap;
use crate::plugin_system::entry::{EntryPointRegistry, UnitRegistrar};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::source::SourceLoader;
use crate::plugin_system::sources::MANIFEST_FILE;

/// Loads plugins that live as plain directories with a `plugin.yml` at
/// their root. This is the development-friendly source: no packing step,
/// the directory itself is the access path.
pub struct FolderSource {
    registrar: Arc<dyn UnitRegistrar>,
}

impl FolderSource {
    pub fn new(registrar: Arc<dyn UnitRegistrar>) -> Self {
        FolderSource { registrar }
    }

    fn read_manifest(&self, path: &Path) -> Result<PluginManifest, PluginSystemError> {
        let manifest_path = path.join(MANIFEST_FILE);
        let content = fs::read_to_string(&manifest_path)
            .map_err(|e| PluginSystemError::io(e, "read_manifest", manifest_path.clone()))?;
        PluginManifest::parse(&content, &manifest_path)
    }
}

impl SourceLoader for FolderSource {
    fn id(&self) -> &'static str {
        "folder"
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.is_dir() && path.join(MANIFEST_FILE).is_file()
    }

    fn describe(
        &self,
        path: &Path,
        plugins: &dyn PluginMap,
    ) -> Result<Option<PluginManifest>, PluginSystemError> {
        let manifest = self.read_manifest(path)?;
        if plugins.get_plugin(&manifest.name).is_some() {
            trace!(
                "Folder source skipping '{}': already present in plugin map",
                manifest.name
            );
            return Ok(None);
        }
        Ok(Some(manifest))
    }

    fn activate(
        &self,
        path: &Path,
        entries: &mut EntryPointRegistry,
    ) -> Result<(), PluginSystemError> {
        let manifest = self.read_manifest(path)?;
        self.registrar.register_units(path, &manifest, entries)
    }
}
