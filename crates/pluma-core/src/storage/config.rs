use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::storage::error::StorageError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml)
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Which of the built-in source loaders the host wants registered.
///
/// The bundle loader is always registered; folder and packed are toggled
/// here, both on by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoaderToggles {
    pub folder: bool,
    pub packed: bool,
}

impl Default for LoaderToggles {
    fn default() -> Self {
        Self {
            folder: true,
            packed: true,
        }
    }
}

/// Host-facing engine settings, loaded from a JSON/YAML/TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Category folder names to scan, relative to the plugins directory.
    pub categories: Vec<String>,
    /// When true, each plugin's data directory sits next to its source
    /// instead of under the shared plugin data root.
    pub legacy_data_dir: bool,
    /// Optional fixed seed for the scan-order shuffle. Unset means a fresh
    /// entropy seed per load call.
    pub shuffle_seed: Option<u64>,
    /// Built-in loader toggles.
    pub loaders: LoaderToggles,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            legacy_data_dir: false,
            shuffle_seed: None,
            loaders: LoaderToggles::default(),
        }
    }
}

impl EngineConfig {
    /// Load a config file, choosing the parser from the file extension.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let format =
            ConfigFormat::from_path(path).ok_or_else(|| StorageError::UnsupportedFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path)
            .map_err(|e| StorageError::io(e, "read_config", path.to_path_buf()))?;
        Self::from_str(&content, format, path)
    }

    /// Load a config file if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, StorageError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config content in the given format.
    pub fn from_str(content: &str, format: ConfigFormat, path: &Path) -> Result<Self, StorageError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| StorageError::Deserialization {
                format: "JSON",
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| StorageError::Deserialization {
                format: "YAML",
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| StorageError::Deserialization {
                format: "TOML",
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Serialize and write the config to `path`, format chosen by extension.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let format =
            ConfigFormat::from_path(path).ok_or_else(|| StorageError::UnsupportedFormat(path.to_path_buf()))?;
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization {
                format: "JSON",
                message: e.to_string(),
            })?,
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| StorageError::Serialization {
                format: "YAML",
                message: e.to_string(),
            })?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| StorageError::Serialization {
                format: "TOML",
                message: e.to_string(),
            })?,
        };
        fs::write(path, content).map_err(|e| StorageError::io(e, "write_config", path.to_path_buf()))
    }
}
