//! Plugin lifecycle management.
//!
//! Every operation rebuilds the registry from version control, acts on it
//! and returns. Nothing is cached between calls and nothing is locked: two
//! processes installing or removing the same plugin at once will race.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::{
    PackageInstaller, PluginDescriptor, PluginError, PluginInspector, PluginResult,
    SubmoduleEntry, SubmoduleRegistry, VersionControl, REQUIREMENTS_FILE,
};

/// What dependency installation did for one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOutcome {
    /// Packages were installed from this file.
    Installed(PathBuf),
    /// The plugin has no dependency file.
    NoDependencyFile,
    /// The submodule is not a recognized plugin.
    NotAPlugin,
}

/// Result of removing a plugin.
///
/// Removal succeeds once the working tree is de-initialized. A failure to
/// delete the leftover metadata directory is carried alongside, not raised.
#[derive(Debug)]
pub struct RemoveOutcome {
    /// Removed plugin.
    pub name: String,
    /// Metadata directory that was (or should have been) deleted.
    pub metadata_dir: PathBuf,
    /// Cleanup failure, if any.
    pub residual: Option<PluginError>,
}

/// Outcome of one entry in a batch install.
#[derive(Debug)]
pub struct EntryOutcome {
    /// Submodule name.
    pub name: String,
    /// What happened.
    pub result: PluginResult<DependencyOutcome>,
}

/// Outcomes of an install-all run, in registry order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per registry entry.
    pub outcomes: Vec<EntryOutcome>,
}

impl BatchReport {
    /// Entries that failed.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &PluginError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    /// Whether every entry succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Number of entries attempted.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the registry was empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Reconciles declared submodules with discovered plugins and performs
/// install and remove transitions.
///
/// The host project root is the backend's working directory; relative
/// submodule paths resolve against it.
pub struct LifecycleManager<V, P> {
    vcs: V,
    installer: P,
    inspector: PluginInspector,
    /// Dependency file name looked up inside each plugin root.
    requirements_file: String,
}

impl<V: VersionControl, P: PackageInstaller> LifecycleManager<V, P> {
    /// Create a manager for the host project checked out by `vcs`.
    pub fn new(vcs: V, installer: P, inspector: PluginInspector) -> Self {
        Self { vcs, installer, inspector, requirements_file: REQUIREMENTS_FILE.to_string() }
    }

    /// Use a different dependency file name.
    pub fn with_requirements_file(mut self, requirements_file: impl Into<String>) -> Self {
        self.requirements_file = requirements_file.into();
        self
    }

    /// Get the host project root.
    pub fn root(&self) -> &Path {
        self.vcs.workdir()
    }

    /// Get the version control backend.
    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Get the package installer.
    pub fn installer(&self) -> &P {
        &self.installer
    }

    /// Get the plugin inspector.
    pub fn inspector(&self) -> &PluginInspector {
        &self.inspector
    }

    /// A fresh view of the submodule registry.
    pub fn registry(&self) -> SubmoduleRegistry<'_, V> {
        SubmoduleRegistry::new(&self.vcs)
    }

    /// All registry entries with their status.
    pub fn entries(&self) -> PluginResult<Vec<SubmoduleEntry>> {
        self.registry().list_entries()
    }

    /// Print every registry entry with its status.
    pub fn list(&self, out: &mut impl Write) -> PluginResult<Vec<SubmoduleEntry>> {
        let entries = self.entries()?;

        writeln!(out, "Available plugins:")?;
        for entry in &entries {
            writeln!(out, "{}", entry.list_line())?;
        }

        Ok(entries)
    }

    /// Install a single plugin by name.
    ///
    /// Installing an already installed plugin checks it out again and
    /// succeeds.
    pub fn install_one(&self, name: &str, out: &mut impl Write) -> PluginResult<DependencyOutcome> {
        let entry = self.lookup(name)?;

        writeln!(out, "Installing plugin: '{}'...", entry.name)?;
        self.materialize(&entry)?;
        self.install_dependencies(&entry, out)
    }

    /// Install every declared plugin.
    ///
    /// A failing entry is recorded and the batch moves on to the next one.
    pub fn install_all(&self, out: &mut impl Write) -> PluginResult<BatchReport> {
        let entries = self.entries()?;
        let mut report = BatchReport::default();

        for entry in entries {
            // A failed progress write only fails this entry
            let result = writeln!(out, "Installing plugin: '{}'...", entry.name)
                .map_err(PluginError::from)
                .and_then(|()| self.materialize(&entry))
                .and_then(|()| self.install_dependencies(&entry, out));

            if let Err(e) = &result {
                tracing::warn!(plugin = %entry.name, error = %e, "Plugin install failed");
            }

            report.outcomes.push(EntryOutcome { name: entry.name, result });
        }

        Ok(report)
    }

    /// Remove a single plugin by name.
    pub fn remove_one(&self, name: &str, out: &mut impl Write) -> PluginResult<RemoveOutcome> {
        let entry = self.lookup(name)?;

        self.vcs.deinit_submodule(&entry.path).map_err(|e| PluginError::Deinit {
            name: entry.name.clone(),
            message: format!("{e:#}"),
        })?;
        tracing::info!(
            plugin = %entry.name,
            path = %entry.path.display(),
            "Submodule deinitialized"
        );

        // Left behind by deinit; a stale copy makes the next install fail
        let metadata_dir = self.vcs.metadata_dir_for(&entry.name);
        let residual = remove_metadata_dir(&entry.name, &metadata_dir).err();
        if let Some(e) = &residual {
            tracing::warn!(plugin = %entry.name, error = %e, "Metadata cleanup failed");
        }

        writeln!(out, "Submodule '{}' has been removed.", entry.name)?;

        Ok(RemoveOutcome { name: entry.name, metadata_dir, residual })
    }

    /// Find the discovered plugin checked out at the entry's path.
    pub fn find_plugin_for(&self, entry: &SubmoduleEntry) -> Option<PluginDescriptor> {
        let root = self.root();
        self.inspector.iter_plugins().find(|plugin| plugin.is_located_at(root, &entry.path))
    }

    fn lookup(&self, name: &str) -> PluginResult<SubmoduleEntry> {
        self.registry().find(name)?.ok_or_else(|| PluginError::PluginNotFound(name.to_string()))
    }

    fn materialize(&self, entry: &SubmoduleEntry) -> PluginResult<()> {
        self.vcs.materialize_submodule(&entry.path).map_err(|e| PluginError::Materialize {
            name: entry.name.clone(),
            message: format!("{e:#}"),
        })?;

        tracing::info!(
            plugin = %entry.name,
            path = %entry.path.display(),
            "Submodule materialized"
        );
        Ok(())
    }

    fn install_dependencies(
        &self,
        entry: &SubmoduleEntry,
        out: &mut impl Write,
    ) -> PluginResult<DependencyOutcome> {
        let Some(plugin) = self.find_plugin_for(entry) else {
            tracing::debug!(plugin = %entry.name, "Submodule is not a recognized plugin");
            return Ok(DependencyOutcome::NotAPlugin);
        };

        let file = plugin.root_dir.join(&self.requirements_file);
        if !file.is_file() {
            tracing::debug!(plugin = %plugin.name, "No dependency file");
            return Ok(DependencyOutcome::NoDependencyFile);
        }

        writeln!(out, "Installing requirements from: {}", file.display())?;
        self.installer.install_from_requirements_file(&file).map_err(|e| {
            PluginError::DependencyInstallation {
                name: entry.name.clone(),
                file: file.clone(),
                message: format!("{e:#}"),
            }
        })?;

        Ok(DependencyOutcome::Installed(file))
    }
}

fn remove_metadata_dir(name: &str, path: &Path) -> PluginResult<bool> {
    if std::fs::symlink_metadata(path).is_err() {
        return Ok(false);
    }

    std::fs::remove_dir_all(path).map_err(|source| PluginError::ResidualMetadataRemoval {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    Ok(true)
}
