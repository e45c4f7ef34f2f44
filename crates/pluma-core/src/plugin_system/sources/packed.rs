use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;
use log::trace;

use crate::plugin_system::adapter::PluginMap;
use crate::plugin_system::entry::{EntryPointRegistry, UnitRegistrar};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::source::SourceLoader;
use crate::plugin_system::sources::{read_archive_manifest, unpack_archive};

/// Loads plugins shipped as gzip-compressed `.tar.gz` / `.tgz` containers.
/// The distribution format for release builds; behaves like
/// [`BundleSource`](super::BundleSource) but without an access prefix.
pub struct PackedSource {
    registrar: Arc<dyn UnitRegistrar>,
    cache_dir: PathBuf,
}

impl PackedSource {
    pub fn new(registrar: Arc<dyn UnitRegistrar>, cache_dir: PathBuf) -> Self {
        PackedSource {
            registrar,
            cache_dir,
        }
    }

    fn open(&self, path: &Path) -> Result<tar::Archive<GzDecoder<File>>, PluginSystemError> {
        let file =
            File::open(path).map_err(|e| PluginSystemError::io(e, "open_packed", path.to_path_buf()))?;
        Ok(tar::Archive::new(GzDecoder::new(file)))
    }

    fn unpack_dir(&self, path: &Path) -> PathBuf {
        // `foo.tar.gz` stems to `foo.tar`; strip the inner extension too.
        let mut stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "packed".to_string());
        if let Some(trimmed) = stem.strip_suffix(".tar") {
            stem = trimmed.to_string();
        }
        self.cache_dir.join(stem)
    }
}

impl SourceLoader for PackedSource {
    fn id(&self) -> &'static str {
        "packed"
    }

    fn can_handle(&self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
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
                    message: "Container does not contain a plugin.yml".to_string(),
                    source: None,
                });
            }
        };
        let manifest = PluginManifest::parse(&content, path)?;
        if plugins.get_plugin(&manifest.name).is_some() {
            trace!(
                "Packed source skipping '{}': already present in plugin map",
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
                message: "Container does not contain a plugin.yml".to_string(),
                source: None,
            }
        })?;
        let manifest = PluginManifest::parse(&content, path)?;

        let dest = self.unpack_dir(path);
        let archive = self.open(path)?;
        unpack_archive(archive, path, &dest)?;

        self.registrar.register_units(&dest, &manifest, entries)
    }
}
