//! Command surface.
//!
//! The command line is assembled at runtime from [`CommandContributor`]s: the
//! built-in plugin manager plus one contributor per discovered plugin. Each
//! contributor describes its own subcommand and handles its own invocation;
//! the surface only maps the matched subcommand name to its contributor.

mod manager;
mod plugin;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgMatches, Args, Parser};
use clap_complete::{generate, Shell};

pub use manager::{run_operation, ListFormat, ManagerOperation, PluginManagerCommand};
pub use plugin::PluginCommand;

use crate::core::Config;
use crate::plugin::PluginInspector;
use crate::{APP_NAME, VERSION};

/// Subcommand reserved for shell completions.
pub const COMPLETIONS_COMMAND: &str = "completions";

/// How a handled command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every requested operation succeeded.
    Success,
    /// At least one requested operation failed.
    Failed,
}

impl Status {
    /// Process exit code for this status.
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failed => ExitCode::FAILURE,
        }
    }
}

/// A component that adds a subcommand to the command line.
pub trait CommandContributor {
    /// Subcommand name.
    fn name(&self) -> &str;

    /// Describe the subcommand and its arguments.
    fn describe_subcommand(&self) -> clap::Command;

    /// Run the subcommand with its parsed arguments.
    fn handle(&self, matches: &ArgMatches) -> anyhow::Result<Status>;
}

// Options accepted before any subcommand. (Plain comment: a doc comment here
// would be picked up by the Args derive and override the root `about` text.)
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Host project directory (defaults to the current directory)
    #[arg(short = 'C', long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Configuration file to use instead of .plugman.toml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Parser used before the plugin subcommands are known.
#[derive(Parser)]
#[command(name = "plugman", disable_help_flag = true, disable_version_flag = true)]
struct Bootstrap {
    #[command(flatten)]
    global: GlobalArgs,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    rest: Vec<OsString>,
}

impl GlobalArgs {
    /// Extract the global options from raw arguments.
    ///
    /// Anything unparseable falls back to defaults; the full parse reports
    /// the error later.
    pub fn bootstrap<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Bootstrap::try_parse_from(args).map(|b| b.global).unwrap_or_default()
    }
}

/// Registry of contributors and dispatcher for parsed arguments.
#[derive(Default)]
pub struct CommandSurface {
    contributors: Vec<Box<dyn CommandContributor>>,
}

impl CommandSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contributor.
    ///
    /// The first contributor registered under a name keeps it; later ones
    /// are skipped and `false` is returned.
    pub fn register(&mut self, contributor: Box<dyn CommandContributor>) -> bool {
        let name = contributor.name();

        if name == COMPLETIONS_COMMAND || self.get(name).is_some() {
            tracing::warn!(name, "Skipping command with a name that is already taken");
            return false;
        }

        tracing::debug!(name, "Registered command");
        self.contributors.push(contributor);
        true
    }

    /// Get a contributor by subcommand name.
    pub fn get(&self, name: &str) -> Option<&dyn CommandContributor> {
        self.contributors.iter().find(|c| c.name() == name).map(|c| &**c)
    }

    /// Names of all registered subcommands.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contributors.iter().map(|c| c.name())
    }

    /// Build the full command line grammar.
    pub fn build_command(&self) -> clap::Command {
        let root = clap::Command::new(APP_NAME)
            .version(VERSION)
            .about("Manage plugins tracked as git submodules of a host project")
            .subcommand(
                clap::Command::new(COMPLETIONS_COMMAND)
                    .about("Generate shell completions")
                    .arg(
                        clap::Arg::new("shell")
                            .required(true)
                            .value_parser(clap::value_parser!(Shell)),
                    ),
            );

        let root = GlobalArgs::augment_args(root);

        self.contributors.iter().fold(root, |root, c| root.subcommand(c.describe_subcommand()))
    }

    /// Run the contributor matching the parsed subcommand.
    ///
    /// Without a subcommand the help text is printed and the run fails.
    pub fn dispatch(&self, matches: &ArgMatches) -> anyhow::Result<Status> {
        match matches.subcommand() {
            Some((COMPLETIONS_COMMAND, sub)) => {
                let shell = sub
                    .get_one::<Shell>("shell")
                    .copied()
                    .ok_or_else(|| anyhow::anyhow!("A shell is required"))?;
                self.write_completions(shell, &mut io::stdout());
                Ok(Status::Success)
            }
            Some((name, sub)) => {
                let contributor =
                    self.get(name).ok_or_else(|| anyhow::anyhow!("Unknown command '{}'", name))?;
                tracing::debug!(command = name, "Dispatching");
                contributor.handle(sub)
            }
            None => {
                self.build_command().print_help()?;
                println!();
                Ok(Status::Failed)
            }
        }
    }

    /// Parse `args` and dispatch them.
    pub fn run_from<I, T>(&self, args: I) -> anyhow::Result<Status>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.build_command().try_get_matches_from(args)?;
        self.dispatch(&matches)
    }

    /// Write completions for the full grammar.
    pub fn write_completions(&self, shell: Shell, out: &mut dyn io::Write) {
        let mut command = self.build_command();
        generate(shell, &mut command, APP_NAME, out);
    }
}

/// Build the surface for a host project.
///
/// `start_dir` is where the user invoked the tool; `host_root` is the root
/// of the repository containing it, or `start_dir` outside a repository.
pub fn build_surface(start_dir: &Path, host_root: &Path, config: &Config) -> CommandSurface {
    let mut surface = CommandSurface::new();

    surface.register(Box::new(PluginManagerCommand::new(start_dir, config.clone())));

    let inspector = PluginInspector::new(config.plugins_dir(host_root))
        .with_manifest_file(config.plugins.manifest_file.clone());
    for plugin in inspector.iter_plugins() {
        surface.register(Box::new(PluginCommand::new(plugin)));
    }

    surface
}
