use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::trace;

use crate::plugin_system::adapter::PluginMap;
use crate::plugin_system::entry::{EntryPointRegistry, UnitRegistrar};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::source::SourceLoader;
use crate::plugin_system::sources::{read_archive_manifest, unpack_archive};

/// Loads plugins shipped as a single uncompressed `.tar` bundle.
///
/// Bundles are unpacked into a per-bundle cache directory on activation,
/// and the access path presented to plugins carries the `bundle://`
/// prefix so code inside can tell it is not running from a live folder.
pub struct BundleSource {
    registrar: Arc<dyn UnitRegistrar>,
    cache_dir: PathBuf,
}

impl BundleSource {
    pub fn new(registrar: Arc<dyn UnitRegistrar>, cache_dir: PathBuf) -> Self {
        BundleSource {
            registrar,
            cache_dir,
        }
    }

    fn open(&self, path: &Path) -> Result<tar::Archive<File>, PluginSystemError> {
        let file =
            File::open(path).map_err(|e| PluginSystemError::io(e, "open_bundle", path.to_path_buf()))?;
        Ok(tar::Archive::new(file))
    }

    fn unpack_dir(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bundle".to_string());
        self.cache_dir.join(stem)
    }
}

impl SourceLoader for BundleSource {
    fn id(&self) -> &'static str {
        "bundle"
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("tar"))
                .unwrap_or(false)
    }

    fn describe(
        &self,
        path: &Path,
        plugins: &dyn PluginMap,
    ) -> Result<Option<PluginManifest>, PluginSystemError> {
        let mut archive = self.open(path)?;
        let content = match read_archive_manifest(&mut archive, path)? {
            Some(content) => content,
            None => {
                return Err(PluginSystemError::Source {
                    path: path.to_path_buf(),
                    message: "Bundle does not contain a plugin.yml".to_string(),
                    source: None,
                });
            }
        };
        let manifest = PluginManifest::parse(&content, path)?;
        if plugins.get_plugin(&manifest.name).is_some() {
            trace!(
                "Bundle source skipping '{}': already present in plugin map",
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
        let mut archive = self.open(path)?;
        let content = read_archive_manifest(&mut archive, path)?.ok_or_else(|| {
            PluginSystemError::Source {
                path: path.to_path_buf(),
                message: "Bundle does not contain a plugin.yml".to_string(),
                source: None,
            }
        })?;
        let manifest = PluginManifest::parse(&content, path)?;

        let dest = self.unpack_dir(path);
        let archive = self.open(path)?;
        unpack_archive(archive, path, &dest)?;

        self.registrar.register_units(&dest, &manifest, entries)
    }

    fn access_prefix(&self) -> &str {
        "bundle://"
    }
}
