//! The `plugin-manager` subcommand.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{ArgMatches, FromArgMatches, Subcommand, ValueEnum};

use super::{CommandContributor, Status};
use crate::core::Config;
use crate::git::GitRepository;
use crate::plugin::{
    CommandInstaller, LifecycleManager, PackageInstaller, PluginError, PluginInspector,
    PluginResult, VersionControl,
};

/// Subcommand name.
pub const PLUGIN_MANAGER_COMMAND: &str = "plugin-manager";

/// Output format for `list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// One line per plugin
    #[default]
    Text,
    /// JSON array
    Json,
}

/// Plugin manager operations.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ManagerOperation {
    /// List all the available plugins
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// Install a plugin
    Install {
        /// Plugin name
        name: String,
    },

    /// Install all the plugins
    InstallAll,

    /// Remove / uninstall a plugin
    Remove {
        /// Plugin name
        name: String,
    },
}

/// Contributes `plugin-manager` and runs it against the git repository
/// containing the start directory.
pub struct PluginManagerCommand {
    start_dir: PathBuf,
    config: Config,
}

impl PluginManagerCommand {
    /// Create the command for a start directory.
    pub fn new(start_dir: &Path, config: Config) -> Self {
        Self { start_dir: start_dir.to_path_buf(), config }
    }

    /// Build the lifecycle manager for the host repository.
    pub fn lifecycle(&self) -> PluginResult<LifecycleManager<GitRepository, CommandInstaller>> {
        let repo = GitRepository::discover(&self.start_dir)?;

        let inspector = PluginInspector::new(self.config.plugins_dir(repo.root()))
            .with_manifest_file(self.config.plugins.manifest_file.clone());

        Ok(LifecycleManager::new(repo, self.config.package_installer(), inspector)
            .with_requirements_file(self.config.plugins.requirements_file.clone()))
    }
}

impl CommandContributor for PluginManagerCommand {
    fn name(&self) -> &str {
        PLUGIN_MANAGER_COMMAND
    }

    fn describe_subcommand(&self) -> clap::Command {
        let command = clap::Command::new(PLUGIN_MANAGER_COMMAND)
            .about("Plugin manager is responsible for a host of actions")
            .subcommand_required(true)
            .arg_required_else_help(true);

        ManagerOperation::augment_subcommands(command)
    }

    fn handle(&self, matches: &ArgMatches) -> anyhow::Result<Status> {
        let operation = ManagerOperation::from_arg_matches(matches)?;
        let manager = self.lifecycle()?;

        let mut out = io::stdout().lock();
        let status = run_operation(&manager, operation, &mut out, &mut io::stderr())?;
        Ok(status)
    }
}

/// Run one operation, printing progress to `out` and failures to `err`.
///
/// Failures tied to a single plugin become a line on `err` and a failed
/// status; failures that prevent reading the registry are returned.
pub fn run_operation<V, P>(
    manager: &LifecycleManager<V, P>,
    operation: ManagerOperation,
    out: &mut impl Write,
    err: &mut impl Write,
) -> PluginResult<Status>
where
    V: VersionControl,
    P: PackageInstaller,
{
    match operation {
        ManagerOperation::List { format: ListFormat::Text } => {
            manager.list(out)?;
            Ok(Status::Success)
        }

        ManagerOperation::List { format: ListFormat::Json } => {
            let entries = manager.entries()?;
            serde_json::to_writer_pretty(&mut *out, &entries).map_err(io::Error::from)?;
            writeln!(out)?;
            Ok(Status::Success)
        }

        ManagerOperation::Install { name } => match manager.install_one(&name, out) {
            Ok(_) => Ok(Status::Success),
            Err(e) => report_failure(e, err),
        },

        ManagerOperation::InstallAll => {
            let report = manager.install_all(out)?;

            for (name, e) in report.failures() {
                tracing::debug!(plugin = name, error = ?e, "Install failed");
                writeln!(err, "{e}")?;
            }

            if report.is_success() {
                Ok(Status::Success)
            } else {
                Ok(Status::Failed)
            }
        }

        ManagerOperation::Remove { name } => match manager.remove_one(&name, out) {
            Ok(outcome) => {
                if let Some(e) = outcome.residual {
                    writeln!(err, "warning: {e}")?;
                }
                Ok(Status::Success)
            }
            Err(e) => report_failure(e, err),
        },
    }
}

fn report_failure(e: PluginError, err: &mut impl Write) -> PluginResult<Status> {
    if e.is_fatal() {
        return Err(e);
    }

    tracing::debug!(plugin = e.plugin_name(), error = ?e, "Operation failed");
    writeln!(err, "{e}")?;
    Ok(Status::Failed)
}
