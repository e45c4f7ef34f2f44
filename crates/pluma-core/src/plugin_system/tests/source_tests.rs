use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::tempdir;

use crate::plugin_system::entry::{EntryPointRegistry, UnitRegistrar};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::source::{LoaderRegistry, SourceLoader};
use crate::plugin_system::sources::{BundleSource, FolderSource, PackedSource};

const MANIFEST: &str = "name: Sample\nversion: 1.0.0\nmain: unit.sample\n";

/// Registrar that records every materialized source it is handed.
#[derive(Default)]
struct RecordingRegistrar {
    calls: Mutex<Vec<(PathBuf, String)>>,
}

impl UnitRegistrar for RecordingRegistrar {
    fn register_units(
        &self,
        source: &Path,
        manifest: &PluginManifest,
        _entries: &mut EntryPointRegistry,
    ) -> Result<(), PluginSystemError> {
        self.calls
            .lock()
            .unwrap()
            .push((source.to_path_buf(), manifest.name.clone()));
        Ok(())
    }
}

fn write_folder_plugin(dir: &Path, manifest: &str) -> PathBuf {
    let plugin_dir = dir.join("sample");
    fs::create_dir_all(&plugin_dir).unwrap();
    fs::write(plugin_dir.join("plugin.yml"), manifest).unwrap();
    plugin_dir
}

fn write_tar(path: &Path, manifest: &str) {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    let mut header = tar::Header::new_gnu();
    header.set_size(manifest.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "plugin.yml", manifest.as_bytes())
        .unwrap();
    builder.finish().unwrap();
}

fn write_tar_gz(path: &Path, manifest: &str) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut header = tar::Header::new_gnu();
    header.set_size(manifest.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "plugin.yml", manifest.as_bytes())
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

#[test]
fn folder_source_handles_directories_with_manifest() {
    let tmp = tempdir().unwrap();
    let plugin_dir = write_folder_plugin(tmp.path(), MANIFEST);
    let bare_dir = tmp.path().join("bare");
    fs::create_dir_all(&bare_dir).unwrap();

    let source = FolderSource::new(Arc::new(RecordingRegistrar::default()));
    assert!(source.can_handle(&plugin_dir));
    assert!(!source.can_handle(&bare_dir));
    assert!(!source.can_handle(&plugin_dir.join("plugin.yml")));
}

#[test]
fn folder_source_describes_and_activates() {
    let tmp = tempdir().unwrap();
    let plugin_dir = write_folder_plugin(tmp.path(), MANIFEST);
    let registrar = Arc::new(RecordingRegistrar::default());
    let source = FolderSource::new(registrar.clone());

    let map = PluginRegistry::new();
    let manifest = source.describe(&plugin_dir, &map).unwrap().unwrap();
    assert_eq!(manifest.name, "Sample");

    let mut entries = EntryPointRegistry::new();
    source.activate(&plugin_dir, &mut entries).unwrap();
    let calls = registrar.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, plugin_dir);
    assert_eq!(calls[0].1, "Sample");
}

#[test]
fn bundle_source_reads_manifest_from_tar() {
    let tmp = tempdir().unwrap();
    let bundle = tmp.path().join("sample.tar");
    write_tar(&bundle, MANIFEST);

    let source = BundleSource::new(
        Arc::new(RecordingRegistrar::default()),
        tmp.path().join("cache"),
    );
    assert!(source.can_handle(&bundle));
    assert_eq!(source.access_prefix(), "bundle://");

    let map = PluginRegistry::new();
    let manifest = source.describe(&bundle, &map).unwrap().unwrap();
    assert_eq!(manifest.name, "Sample");
}

#[test]
fn bundle_source_unpacks_into_cache_on_activation() {
    let tmp = tempdir().unwrap();
    let bundle = tmp.path().join("sample.tar");
    write_tar(&bundle, MANIFEST);

    let registrar = Arc::new(RecordingRegistrar::default());
    let cache = tmp.path().join("cache");
    let source = BundleSource::new(registrar.clone(), cache.clone());

    let mut entries = EntryPointRegistry::new();
    source.activate(&bundle, &mut entries).unwrap();

    let unpacked = cache.join("sample");
    assert!(unpacked.join("plugin.yml").is_file());
    let calls = registrar.calls.lock().unwrap();
    assert_eq!(calls[0].0, unpacked);
}

#[test]
fn bundle_without_manifest_is_a_source_error() {
    let tmp = tempdir().unwrap();
    let bundle = tmp.path().join("empty.tar");
    let mut builder = tar::Builder::new(File::create(&bundle).unwrap());
    builder.finish().unwrap();

    let source = BundleSource::new(
        Arc::new(RecordingRegistrar::default()),
        tmp.path().join("cache"),
    );
    let map = PluginRegistry::new();
    let err = source.describe(&bundle, &map).unwrap_err();
    assert!(matches!(err, PluginSystemError::Source { .. }));
}

#[test]
fn packed_source_handles_gz_extensions_only() {
    let tmp = tempdir().unwrap();
    let packed = tmp.path().join("sample.tar.gz");
    write_tar_gz(&packed, MANIFEST);
    let plain = tmp.path().join("sample.tar");
    write_tar(&plain, MANIFEST);

    let source = PackedSource::new(
        Arc::new(RecordingRegistrar::default()),
        tmp.path().join("cache"),
    );
    assert!(source.can_handle(&packed));
    assert!(!source.can_handle(&plain));
    assert_eq!(source.access_prefix(), "");
}

#[test]
fn packed_source_strips_double_extension_when_unpacking() {
    let tmp = tempdir().unwrap();
    let packed = tmp.path().join("sample.tar.gz");
    write_tar_gz(&packed, MANIFEST);

    let registrar = Arc::new(RecordingRegistrar::default());
    let cache = tmp.path().join("cache");
    let source = PackedSource::new(registrar.clone(), cache.clone());

    let mut entries = EntryPointRegistry::new();
    source.activate(&packed, &mut entries).unwrap();
    assert!(cache.join("sample").join("plugin.yml").is_file());
}

#[test]
fn describe_skips_already_loaded_plugins() {
    let tmp = tempdir().unwrap();
    let plugin_dir = write_folder_plugin(tmp.path(), MANIFEST);

    struct Stub;
    impl crate::plugin_system::traits::Plugin for Stub {
        fn name(&self) -> &str {
            "Sample"
        }
        fn version(&self) -> &str {
            "1.0.0"
        }
    }
    let mut map = PluginRegistry::new();
    use crate::plugin_system::adapter::PluginMap;
    map.set_plugin("Sample", Arc::new(Stub));

    let source = FolderSource::new(Arc::new(RecordingRegistrar::default()));
    assert!(source.describe(&plugin_dir, &map).unwrap().is_none());
}

#[test]
fn loader_registry_replaces_by_id() {
    let registrar: Arc<dyn UnitRegistrar> = Arc::new(RecordingRegistrar::default());
    let mut registry = LoaderRegistry::new();
    registry.register(Arc::new(FolderSource::new(Arc::clone(&registrar))));
    registry.register(Arc::new(FolderSource::new(registrar)));
    assert_eq!(registry.count(), 1);
    assert_eq!(registry.ids(), vec!["folder"]);
}
