//! Plugin system for plugman.
//!
//! Plugins are git submodules of a host project. This module discovers them
//! on disk, reads which submodules are declared and checked out, and moves
//! plugins between the `available` and `installed` states.
//!
//! # Layout
//!
//! A plugin is any directory below the plugins directory that carries a
//! manifest. It may also declare Python-style dependencies:
//!
//! ```text
//! plugins/
//! └── virsh/
//!     ├── plugin.toml
//!     └── plugin_requirements.txt
//! ```

mod error;
mod inspector;
mod installer;
mod lifecycle;
mod manifest;
mod registry;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{PluginError, PluginResult};
pub use inspector::PluginInspector;
pub use installer::{CommandInstaller, PackageInstaller};
pub use lifecycle::{BatchReport, DependencyOutcome, EntryOutcome, LifecycleManager, RemoveOutcome};
pub use manifest::{PluginManifest, PluginMetadata};
pub use registry::{SubmoduleInfo, SubmoduleRegistry, VersionControl};
pub use types::{
    normalize_path, same_location, PluginDescriptor, SubmoduleEntry, SubmoduleStatus,
    MANIFEST_FILE, PLUGINS_DIR, REQUIREMENTS_FILE,
};
