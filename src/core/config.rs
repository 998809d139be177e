//! Configuration management for plugman.
//!
//! Handles loading configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::plugin::{CommandInstaller, MANIFEST_FILE, PLUGINS_DIR, REQUIREMENTS_FILE};

/// Project-local configuration file, looked up in the host root.
pub const LOCAL_CONFIG_FILE: &str = ".plugman.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plugin discovery settings
    pub plugins: PluginsConfig,

    /// Dependency installer settings
    pub installer: InstallerConfig,
}

/// Plugin discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Directory walked for plugins, relative to the host root
    pub dir: PathBuf,

    /// Marker file that makes a directory a plugin
    pub manifest_file: String,

    /// Dependency file looked up in each plugin root
    pub requirements_file: String,
}

/// Package installer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Program to run
    pub program: String,

    /// Arguments placed before the dependency file path
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise the project-local file in
    /// `host_root` wins over the user config, and defaults apply when
    /// neither exists.
    pub fn load(explicit: Option<&Path>, host_root: &Path) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let local_config = host_root.join(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Get the user configuration directory.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plugman"))
    }

    /// Plugins directory resolved against the host root.
    pub fn plugins_dir(&self, host_root: &Path) -> PathBuf {
        host_root.join(&self.plugins.dir)
    }

    /// Build the configured package installer.
    pub fn package_installer(&self) -> CommandInstaller {
        CommandInstaller::new(self.installer.program.clone(), self.installer.args.clone())
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(PLUGINS_DIR),
            manifest_file: MANIFEST_FILE.to_string(),
            requirements_file: REQUIREMENTS_FILE.to_string(),
        }
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self { program: "pip".to_string(), args: vec!["install".to_string(), "-r".to_string()] }
    }
}
