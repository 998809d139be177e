//! Plugin discovery.
//!
//! Walks the plugins directory and yields a descriptor for every directory
//! that carries a plugin manifest.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{PluginDescriptor, PluginManifest, MANIFEST_FILE};

/// Discovers plugins below a directory.
#[derive(Debug, Clone)]
pub struct PluginInspector {
    /// Directory to walk.
    plugins_dir: PathBuf,
    /// Marker file that makes a directory a plugin.
    manifest_file: String,
}

impl PluginInspector {
    /// Create an inspector using the default manifest file name.
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self { plugins_dir: plugins_dir.into(), manifest_file: MANIFEST_FILE.to_string() }
    }

    /// Use a different manifest file name.
    pub fn with_manifest_file(mut self, manifest_file: impl Into<String>) -> Self {
        self.manifest_file = manifest_file.into();
        self
    }

    /// Get the directory being walked.
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// Lazily walk the plugins directory.
    ///
    /// Every call starts a fresh walk. Order follows the filesystem and must
    /// not be relied upon.
    pub fn iter_plugins(&self) -> impl Iterator<Item = PluginDescriptor> + '_ {
        WalkDir::new(&self.plugins_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_git_dir(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable path");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(move |entry| self.load_plugin(entry.path()))
    }

    /// Find a discovered plugin by name.
    pub fn get_plugin(&self, name: &str) -> Option<PluginDescriptor> {
        self.iter_plugins().find(|plugin| plugin.name == name)
    }

    fn load_plugin(&self, dir: &Path) -> Option<PluginDescriptor> {
        let manifest_path = dir.join(&self.manifest_file);
        if !manifest_path.is_file() {
            return None;
        }

        tracing::debug!(path = %dir.display(), "Trying to load plugin");

        let loaded = PluginManifest::from_file(&manifest_path)
            .and_then(|manifest| manifest.validate().map(|()| manifest));

        match loaded {
            Ok(manifest) => Some(manifest.into_descriptor(dir)),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Error loading plugin");
                None
            }
        }
    }
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}
