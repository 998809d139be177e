//! Plugin system error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur during plugin operations.
///
/// Collaborator failures (git, the package installer) never escape the
/// lifecycle manager as-is; they are converted into one of these variants
/// with the plugin name attached.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The working directory is not inside a git work tree.
    #[error("Not inside a git repository: {}", .0.display())]
    HostRepositoryNotFound(PathBuf),

    /// Named plugin is not declared as a submodule.
    #[error("Plugin '{0}' was not found in submodules")]
    PluginNotFound(String),

    /// Checking out the submodule working tree failed.
    #[error("Failed to install plugin '{name}': {message}")]
    Materialize { name: String, message: String },

    /// De-initializing the submodule working tree failed.
    #[error("Failed to remove plugin '{name}': {message}")]
    Deinit { name: String, message: String },

    /// The package installer rejected the plugin's dependency file.
    #[error("Failed to install requirements for '{name}' from {}: {message}", .file.display())]
    DependencyInstallation { name: String, file: PathBuf, message: String },

    /// The submodule was de-initialized but its metadata directory stayed behind.
    #[error("Plugin '{name}' was removed but {} could not be deleted: {source}", .path.display())]
    ResidualMetadataRemoval {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Submodule declarations could not be read.
    #[error("Failed to read submodules: {0}")]
    Registry(String),

    /// Invalid plugin manifest.
    #[error("Invalid plugin manifest: {0}")]
    InvalidManifest(String),

    /// Plugin has no runnable entry point.
    #[error("Plugin '{0}' does not declare an entry point")]
    NoEntryPoint(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Name of the plugin this error refers to, if any.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            Self::PluginNotFound(name) | Self::NoEntryPoint(name) => Some(name),
            Self::Materialize { name, .. }
            | Self::Deinit { name, .. }
            | Self::DependencyInstallation { name, .. }
            | Self::ResidualMetadataRemoval { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether the error stops every operation, not just the current one.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::HostRepositoryNotFound(_) | Self::Registry(_))
    }
}
