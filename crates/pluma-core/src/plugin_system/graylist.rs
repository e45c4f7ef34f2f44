use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::plugin_system::error::PluginSystemError;

/// Bundled default graylist: deny mode with no names, i.e. everything passes.
pub const DEFAULT_GRAYLIST: &str = "\
# Plugin graylist.
# mode: whitelist  - only the listed plugins may load
# mode: blacklist  - the listed plugins may not load
mode: blacklist
plugins: []
";

/// Policy mode: Allow = whitelist, Deny = blacklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraylistMode {
    Allow,
    Deny,
}

#[derive(Deserialize, Debug)]
struct RawGraylist {
    mode: String,
    #[serde(default)]
    plugins: Vec<String>,
}

/// Name allow/deny policy consulted once per discovered candidate.
/// Immutable for the duration of a load run.
#[derive(Debug, Clone)]
pub struct PluginGraylist {
    mode: GraylistMode,
    names: HashSet<String>,
}

impl PluginGraylist {
    pub fn new(mode: GraylistMode, names: impl IntoIterator<Item = String>) -> Self {
        Self {
            mode,
            names: names.into_iter().collect(),
        }
    }

    /// Parse a graylist document. A malformed document is fatal to the whole
    /// load operation, since policy cannot be safely assumed.
    pub fn parse(content: &str, path: &Path) -> Result<Self, PluginSystemError> {
        let raw: RawGraylist =
            serde_yaml::from_str(content).map_err(|e| PluginSystemError::GraylistParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mode = match raw.mode.as_str() {
            "whitelist" => GraylistMode::Allow,
            "blacklist" => GraylistMode::Deny,
            other => {
                return Err(PluginSystemError::GraylistParse {
                    path: path.to_path_buf(),
                    message: format!("Unknown graylist mode '{}'", other),
                });
            }
        };

        Ok(Self::new(mode, raw.plugins))
    }

    /// Load a graylist file, seeding it from the bundled default when absent.
    pub fn load_or_seed(path: &Path) -> Result<Self, PluginSystemError> {
        if !path.exists() {
            fs::write(path, DEFAULT_GRAYLIST)
                .map_err(|e| PluginSystemError::io(e, "seed_graylist", path.to_path_buf()))?;
        }
        let content = fs::read_to_string(path)
            .map_err(|e| PluginSystemError::io(e, "read_graylist", path.to_path_buf()))?;
        Self::parse(&content, path)
    }

    /// Whether a plugin of this name may load under the policy.
    pub fn is_allowed(&self, name: &str) -> bool {
        match self.mode {
            GraylistMode::Allow => self.names.contains(name),
            GraylistMode::Deny => !self.names.contains(name),
        }
    }

    pub fn is_whitelist(&self) -> bool {
        self.mode == GraylistMode::Allow
    }
}
