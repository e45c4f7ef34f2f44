//! Reference [`SourceLoader`](crate::plugin_system::source::SourceLoader)
//! implementations: uncompressed folders, single-file tar bundles, and
//! gzip-compressed containers.

pub mod bundle;
pub mod folder;
pub mod packed;

pub use bundle::BundleSource;
pub use folder::FolderSource;
pub use packed::PackedSource;

use std::io::Read;
use std::path::Path;

use crate::plugin_system::error::PluginSystemError;

/// Manifest file name looked for inside every source kind.
pub const MANIFEST_FILE: &str = "plugin.yml";

/// Scan a tar archive for a top-level `plugin.yml` and return its content.
pub(crate) fn read_archive_manifest<R: Read>(
    archive: &mut tar::Archive<R>,
    archive_path: &Path,
) -> Result<Option<String>, PluginSystemError> {
    let entries = archive.entries().map_err(|e| PluginSystemError::Source {
        path: archive_path.to_path_buf(),
        message: "Failed to read archive entries".to_string(),
        source: Some(Box::new(e)),
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| PluginSystemError::Source {
            path: archive_path.to_path_buf(),
            message: "Corrupt archive entry".to_string(),
            source: Some(Box::new(e)),
        })?;
        let is_manifest = entry
            .path()
            .map(|p| p.as_ref() == Path::new(MANIFEST_FILE))
            .unwrap_or(false);
        if is_manifest {
            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .map_err(|e| PluginSystemError::Source {
                    path: archive_path.to_path_buf(),
                    message: "Failed to read archive manifest".to_string(),
                    source: Some(Box::new(e)),
                })?;
            return Ok(Some(content));
        }
    }
    Ok(None)
}

/// Unpack a tar archive under `dest`, creating it first.
pub(crate) fn unpack_archive<R: Read>(
    mut archive: tar::Archive<R>,
    archive_path: &Path,
    dest: &Path,
) -> Result<(), PluginSystemError> {
    std::fs::create_dir_all(dest)
        .map_err(|e| PluginSystemError::io(e, "create_unpack_dir", dest.to_path_buf()))?;
    archive.unpack(dest).map_err(|e| PluginSystemError::Source {
        path: archive_path.to_path_buf(),
        message: format!("Failed to unpack archive into '{}'", dest.display()),
        source: Some(Box::new(e)),
    })
}
