//! Submodule registry view.
//!
//! Joins the host repository's submodule declarations with what is actually
//! checked out on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{PluginError, PluginResult, SubmoduleEntry};

/// A submodule as declared by the host repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleInfo {
    /// Submodule name.
    pub name: String,
    /// Path relative to the repository root.
    pub path: PathBuf,
}

impl SubmoduleInfo {
    /// Create a new submodule declaration.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

/// Version control operations needed to manage plugins.
///
/// Paths are relative to [`VersionControl::workdir`]. Mutating operations
/// always force, so running them twice is harmless.
pub trait VersionControl {
    /// Root of the host repository working tree.
    fn workdir(&self) -> &Path;

    /// Declared submodules, in the backend's native order.
    fn list_submodules(&self) -> anyhow::Result<Vec<SubmoduleInfo>>;

    /// Whether the submodule's working tree is checked out and populated.
    fn submodule_working_tree_exists(&self, path: &Path) -> bool;

    /// Initialize and check out the submodule, overwriting stale state.
    fn materialize_submodule(&self, path: &Path) -> anyhow::Result<()>;

    /// Remove the submodule's working tree.
    fn deinit_submodule(&self, path: &Path) -> anyhow::Result<()>;

    /// Directory where the backend keeps the submodule's repository data.
    fn metadata_dir_for(&self, name: &str) -> PathBuf;
}

/// Read-only view over the host repository's submodules.
pub struct SubmoduleRegistry<'a, V: ?Sized> {
    vcs: &'a V,
}

impl<'a, V: VersionControl + ?Sized> SubmoduleRegistry<'a, V> {
    /// Create a registry view over a version control backend.
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs }
    }

    /// List every declared submodule with its installation status.
    pub fn list_entries(&self) -> PluginResult<Vec<SubmoduleEntry>> {
        let submodules =
            self.vcs.list_submodules().map_err(|e| PluginError::Registry(format!("{e:#}")))?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(submodules.len());

        for submodule in submodules {
            if !seen.insert(submodule.name.clone()) {
                tracing::warn!(name = %submodule.name, "Ignoring duplicate submodule declaration");
                continue;
            }

            let installed = self.vcs.submodule_working_tree_exists(&submodule.path);
            entries.push(SubmoduleEntry { name: submodule.name, path: submodule.path, installed });
        }

        tracing::debug!(count = entries.len(), "Loaded submodule registry");

        Ok(entries)
    }

    /// Find a submodule by name.
    pub fn find(&self, name: &str) -> PluginResult<Option<SubmoduleEntry>> {
        Ok(self.list_entries()?.into_iter().find(|entry| entry.name == name))
    }
}
