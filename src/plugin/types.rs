//! Core plugin types.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A directory discovered on disk that looks like a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    /// Plugin name, taken from its manifest.
    pub name: String,
    /// Directory holding the manifest.
    pub root_dir: PathBuf,
    /// One-line description shown in help output.
    pub description: Option<String>,
    /// Version reported by the plugin's subcommand.
    pub version: Option<String>,
    /// Command run when the plugin's subcommand is invoked.
    pub entry: Option<String>,
}

impl PluginDescriptor {
    /// Create a descriptor with no description or entry point.
    pub fn new(name: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_dir: root_dir.into(),
            description: None,
            version: None,
            entry: None,
        }
    }

    /// Whether this plugin lives at `path`, compared as normalized absolute paths.
    pub fn is_located_at(&self, base: &Path, path: &Path) -> bool {
        same_location(base, &self.root_dir, path)
    }
}

/// Installation status of a submodule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmoduleStatus {
    /// Working tree is checked out.
    Installed,
    /// Declared but not checked out.
    Available,
}

impl SubmoduleStatus {
    /// Get the label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Available => "available",
        }
    }
}

impl std::fmt::Display for SubmoduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A declared submodule of the host repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoduleEntry {
    /// Submodule name (unique within the host repository).
    pub name: String,
    /// Path relative to the host repository root.
    pub path: PathBuf,
    /// Whether the working tree is materialized.
    pub installed: bool,
}

impl SubmoduleEntry {
    /// Get the entry status.
    pub fn status(&self) -> SubmoduleStatus {
        if self.installed {
            SubmoduleStatus::Installed
        } else {
            SubmoduleStatus::Available
        }
    }

    /// Render the entry the way `list` prints it.
    pub fn list_line(&self) -> String {
        format!("\t [{}] {}", self.status(), self.name)
    }
}

/// Plugin manifest file name.
pub const MANIFEST_FILE: &str = "plugin.toml";

/// Per-plugin dependency declaration file.
pub const REQUIREMENTS_FILE: &str = "plugin_requirements.txt";

/// Default plugins directory, relative to the host root.
pub const PLUGINS_DIR: &str = "plugins";

/// Resolve `path` against `base` and normalize it.
///
/// Existing paths are canonicalized so symlinked roots compare equal. Paths
/// that do not exist yet are normalized lexically: `.` is dropped, `..` pops
/// a component and trailing separators disappear.
pub fn normalize_path(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() { path.to_path_buf() } else { base.join(path) };

    if let Ok(canonical) = std::fs::canonicalize(&joined) {
        return canonical;
    }

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Check whether two paths refer to the same location under `base`.
pub fn same_location(base: &Path, a: &Path, b: &Path) -> bool {
    normalize_path(base, a) == normalize_path(base, b)
}
