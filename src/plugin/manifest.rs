//! Plugin manifest parsing and validation.
//!
//! A plugin manifest is a TOML file at the root of a plugin directory. Its
//! presence is what makes a directory a plugin.
//!
//! ```toml
//! [plugin]
//! name = "virsh"
//! description = "Provision virtual machines"
//! entry = "bin/run.sh"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{PluginDescriptor, PluginError, PluginResult};

/// Plugin manifest containing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin metadata.
    pub plugin: PluginMetadata,
}

/// Plugin metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Plugin name (unique identifier, also its subcommand name).
    pub name: String,
    /// Plugin version.
    #[serde(default)]
    pub version: Option<String>,
    /// Plugin description.
    #[serde(default)]
    pub description: Option<String>,
    /// Command to run, relative to the plugin root.
    #[serde(default)]
    pub entry: Option<String>,
}

impl PluginManifest {
    /// Parse a manifest from TOML string.
    pub fn from_toml(content: &str) -> PluginResult<Self> {
        toml::from_str(content).map_err(|e| PluginError::InvalidManifest(e.to_string()))
    }

    /// Parse a manifest from a file.
    pub fn from_file(path: &Path) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Validate the manifest.
    pub fn validate(&self) -> PluginResult<()> {
        if self.plugin.name.is_empty() {
            return Err(PluginError::InvalidManifest("Plugin name is required".to_string()));
        }

        // Names become subcommands, so keep them shell friendly
        if self.plugin.name.starts_with('-')
            || !self.plugin.name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(PluginError::InvalidManifest(format!(
                "Plugin name '{}' may only use alphanumerics, hyphens and underscores",
                self.plugin.name
            )));
        }

        if self.plugin.entry.as_deref().is_some_and(|entry| entry.trim().is_empty()) {
            return Err(PluginError::InvalidManifest(format!(
                "Plugin '{}' declares an empty entry",
                self.plugin.name
            )));
        }

        Ok(())
    }

    /// Build a descriptor for the plugin rooted at `root_dir`.
    pub fn into_descriptor(self, root_dir: &Path) -> PluginDescriptor {
        PluginDescriptor {
            name: self.plugin.name,
            root_dir: root_dir.to_path_buf(),
            description: self.plugin.description,
            version: self.plugin.version,
            entry: self.plugin.entry,
        }
    }
}
