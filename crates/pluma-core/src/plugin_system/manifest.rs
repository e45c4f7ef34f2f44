use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::{ApiVersion, VersionRange};

/// Default-grant tier for a declared permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultGrant {
    /// Granted to everyone.
    Always,
    /// Granted to operators only.
    Operator,
    /// Granted to everyone except operators.
    NotOperator,
}

/// Permission declarations grouped by default-grant tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct PermissionDecls {
    pub always: Vec<String>,
    pub operator: Vec<String>,
    pub not_operator: Vec<String>,
}

impl PermissionDecls {
    /// Iterate all declared permission names with their tier.
    pub fn iter(&self) -> impl Iterator<Item = (DefaultGrant, &str)> {
        self.always
            .iter()
            .map(|n| (DefaultGrant::Always, n.as_str()))
            .chain(
                self.operator
                    .iter()
                    .map(|n| (DefaultGrant::Operator, n.as_str())),
            )
            .chain(
                self.not_operator
                    .iter()
                    .map(|n| (DefaultGrant::NotOperator, n.as_str())),
            )
    }

    pub fn is_empty(&self) -> bool {
        self.always.is_empty() && self.operator.is_empty() && self.not_operator.is_empty()
    }
}

// --- Intermediate struct for deserialization ---

#[derive(Deserialize, Debug)]
struct RawManifest {
    name: String,
    version: String,
    main: String,
    #[serde(default)]
    api: Vec<String>,
    #[serde(default)]
    depend: Vec<String>,
    #[serde(default)]
    softdepend: Vec<String>,
    #[serde(default)]
    loadbefore: Vec<String>,
    #[serde(default)]
    permissions: PermissionDecls,
}

/// Parsed summary of a plugin's `plugin.yml`. Immutable after parse.
#[derive(Debug, Clone)]
pub struct PluginManifest {
    /// Unique plugin name; may not be reused across sources.
    pub name: String,
    /// Plugin version string (informational, not used for dependency solving).
    pub version: String,
    /// Symbolic entry-point reference resolved at activation.
    pub main: String,
    /// Host API constraints this plugin accepts. Empty means any.
    pub api: Vec<VersionRange>,
    /// Hard dependencies: must be activated first, absence is a load error.
    pub depend: Vec<String>,
    /// Soft dependencies: should activate first if present, absence tolerated.
    pub softdepend: Vec<String>,
    /// Inverse soft dependencies: this plugin should load before each target.
    pub loadbefore: Vec<String>,
    /// Declared permissions, grouped by default-grant tier.
    pub permissions: PermissionDecls,
}

impl PluginManifest {
    /// Parse a manifest document (`plugin.yml` content). `path` is only used
    /// for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self, PluginSystemError> {
        let raw: RawManifest =
            serde_yaml::from_str(content).map_err(|e| PluginSystemError::ManifestParse {
                path: path.to_path_buf(),
                message: format!("Failed to parse manifest YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        if raw.name.is_empty() {
            return Err(PluginSystemError::ManifestParse {
                path: path.to_path_buf(),
                message: "Manifest 'name' may not be empty".to_string(),
                source: None,
            });
        }

        let mut api = Vec::with_capacity(raw.api.len());
        for constraint in &raw.api {
            match VersionRange::from_constraint(constraint) {
                Ok(range) => api.push(range),
                Err(e) => {
                    return Err(PluginSystemError::ManifestParse {
                        path: path.to_path_buf(),
                        message: format!("Failed to parse API constraint '{}': {}", constraint, e),
                        source: None,
                    });
                }
            }
        }

        Ok(Self {
            name: raw.name,
            version: raw.version,
            main: raw.main,
            api,
            depend: raw.depend,
            softdepend: raw.softdepend,
            loadbefore: raw.loadbefore,
            permissions: raw.permissions,
        })
    }

    /// Checks the manifest's API constraints against the host version.
    /// `None` means compatible; `Some` carries the offending constraint list.
    pub fn api_incompatibility(&self, host: &ApiVersion) -> Option<String> {
        if self.api.is_empty() {
            return None;
        }
        let host_semver = host.as_semver();
        if self.api.iter().any(|range| range.includes(&host_semver)) {
            None
        } else {
            Some(
                self.api
                    .iter()
                    .map(VersionRange::constraint_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        }
    }

    /// Name and version in display form, e.g. `MyPlugin v1.2.0`.
    pub fn full_name(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }
}

/// Builder for creating a plugin manifest programmatically (hosts and tests).
pub struct ManifestBuilder {
    manifest: PluginManifest,
}

impl ManifestBuilder {
    pub fn new(name: &str, version: &str, main: &str) -> Self {
        Self {
            manifest: PluginManifest {
                name: name.to_string(),
                version: version.to_string(),
                main: main.to_string(),
                api: Vec::new(),
                depend: Vec::new(),
                softdepend: Vec::new(),
                loadbefore: Vec::new(),
                permissions: PermissionDecls::default(),
            },
        }
    }

    pub fn api(mut self, range: VersionRange) -> Self {
        self.manifest.api.push(range);
        self
    }

    pub fn depend(mut self, name: &str) -> Self {
        self.manifest.depend.push(name.to_string());
        self
    }

    pub fn softdepend(mut self, name: &str) -> Self {
        self.manifest.softdepend.push(name.to_string());
        self
    }

    pub fn loadbefore(mut self, name: &str) -> Self {
        self.manifest.loadbefore.push(name.to_string());
        self
    }

    pub fn permission(mut self, tier: DefaultGrant, name: &str) -> Self {
        match tier {
            DefaultGrant::Always => self.manifest.permissions.always.push(name.to_string()),
            DefaultGrant::Operator => self.manifest.permissions.operator.push(name.to_string()),
            DefaultGrant::NotOperator => {
                self.manifest.permissions.not_operator.push(name.to_string())
            }
        }
        self
    }

    pub fn build(self) -> PluginManifest {
        self.manifest
    }
}
