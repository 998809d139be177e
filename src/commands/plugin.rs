//! Subcommands contributed by discovered plugins.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command as ProcessCommand, Stdio};

use clap::{Arg, ArgAction, ArgMatches};

use super::{CommandContributor, Status};
use crate::plugin::{PluginDescriptor, PluginError, PluginResult};

/// Environment variable holding the plugin root for the entry command.
pub const PLUGIN_ROOT_ENV: &str = "PLUGMAN_PLUGIN_ROOT";

/// Runs a plugin's entry command.
pub struct PluginCommand {
    plugin: PluginDescriptor,
}

impl PluginCommand {
    /// Create the command for a discovered plugin.
    pub fn new(plugin: PluginDescriptor) -> Self {
        Self { plugin }
    }

    /// The plugin behind this command.
    pub fn plugin(&self) -> &PluginDescriptor {
        &self.plugin
    }

    /// Run the entry command with `args`, or describe it on `out` when
    /// `dry_run` is set.
    pub fn run(
        &self,
        args: &[OsString],
        dry_run: bool,
        out: &mut impl Write,
    ) -> PluginResult<Status> {
        let entry = self
            .plugin
            .entry
            .as_deref()
            .ok_or_else(|| PluginError::NoEntryPoint(self.plugin.name.clone()))?;

        if dry_run {
            writeln!(out, "Would run: {}", display_command(entry, args))?;
            writeln!(out, "  in {}", self.plugin.root_dir.display())?;
            return Ok(Status::Success);
        }

        tracing::debug!(plugin = %self.plugin.name, entry, "Running plugin");

        let mut cmd = shell_command(entry, &self.plugin.name, args);
        cmd.current_dir(&self.plugin.root_dir)
            .env(PLUGIN_ROOT_ENV, &self.plugin.root_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd.status()?;
        if status.success() {
            Ok(Status::Success)
        } else {
            tracing::debug!(
                plugin = %self.plugin.name,
                code = ?status.code(),
                "Plugin exited with failure"
            );
            Ok(Status::Failed)
        }
    }
}

impl CommandContributor for PluginCommand {
    fn name(&self) -> &str {
        &self.plugin.name
    }

    fn describe_subcommand(&self) -> clap::Command {
        let about = self
            .plugin
            .description
            .clone()
            .unwrap_or_else(|| format!("Run the {} plugin", self.plugin.name));

        let mut command = clap::Command::new(self.plugin.name.clone()).about(about);
        if let Some(version) = &self.plugin.version {
            command = command.version(version.clone());
        }

        command
            .arg(
                Arg::new("dry_run")
                    .long("dry-run")
                    .action(ArgAction::SetTrue)
                    .help("Show the command without running it"),
            )
            .arg(
                Arg::new("args")
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true)
                    .value_parser(clap::value_parser!(OsString))
                    .help("Arguments passed to the plugin"),
            )
    }

    fn handle(&self, matches: &ArgMatches) -> anyhow::Result<Status> {
        let args: Vec<OsString> =
            matches.get_many::<OsString>("args").map(|v| v.cloned().collect()).unwrap_or_default();
        let dry_run = matches.get_flag("dry_run");

        Ok(self.run(&args, dry_run, &mut io::stdout().lock())?)
    }
}

/// Build the platform shell invocation for `entry` followed by `args`.
#[cfg(not(windows))]
fn shell_command(entry: &str, name: &str, args: &[OsString]) -> ProcessCommand {
    // Positional parameters keep each argument intact through the shell
    let mut cmd = ProcessCommand::new("sh");
    cmd.arg("-c").arg(format!("{entry} \"$@\"")).arg(name).args(args);
    cmd
}

#[cfg(windows)]
fn shell_command(entry: &str, _name: &str, args: &[OsString]) -> ProcessCommand {
    let mut cmd = ProcessCommand::new("cmd");
    cmd.arg("/C").arg(entry).args(args);
    cmd
}

fn display_command(entry: &str, args: &[OsString]) -> String {
    std::iter::once(entry.to_string())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plugin(temp: &TempDir, entry: Option<&str>) -> PluginCommand {
        let mut descriptor = PluginDescriptor::new("virsh", temp.path());
        descriptor.description = Some("Manage libvirt domains".to_string());
        descriptor.entry = entry.map(String::from);
        PluginCommand::new(descriptor)
    }

    fn parse(command: &PluginCommand, args: &[&str]) -> ArgMatches {
        command
            .describe_subcommand()
            .try_get_matches_from(std::iter::once("virsh").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_describe_subcommand() {
        let temp = TempDir::new().unwrap();
        let command = plugin(&temp, Some("./run.sh"));
        let described = command.describe_subcommand();

        assert_eq!(described.get_name(), "virsh");
        let about = described.get_about().map(|a| a.to_string());
        assert_eq!(about.as_deref(), Some("Manage libvirt domains"));
        described.debug_assert();
    }

    #[test]
    fn test_manifest_version_is_reported() {
        let temp = TempDir::new().unwrap();
        let mut descriptor = PluginDescriptor::new("virsh", temp.path());
        descriptor.version = Some("1.2.0".to_string());
        let command = PluginCommand::new(descriptor);

        let described = command.describe_subcommand();
        assert_eq!(described.get_version(), Some("1.2.0"));

        let unversioned = plugin(&temp, None).describe_subcommand();
        assert!(unversioned.get_version().is_none());
    }

    #[test]
    fn test_trailing_arguments_keep_hyphens() {
        let temp = TempDir::new().unwrap();
        let command = plugin(&temp, Some("./run.sh"));
        let matches = parse(&command, &["--dry-run", "list", "--all", "-q"]);

        assert!(matches.get_flag("dry_run"));
        let args: Vec<_> = matches.get_many::<OsString>("args").unwrap().cloned().collect();
        let expected: Vec<OsString> = ["list", "--all", "-q"].iter().map(OsString::from).collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_dry_run_prints_command() {
        let temp = TempDir::new().unwrap();
        let command = plugin(&temp, Some("./run.sh"));
        let mut out = Vec::new();

        let status = command.run(&[OsString::from("list")], true, &mut out).unwrap();

        assert_eq!(status, Status::Success);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Would run: ./run.sh list\n"));
    }

    #[test]
    fn test_missing_entry_point() {
        let temp = TempDir::new().unwrap();
        let command = plugin(&temp, None);

        let result = command.run(&[], false, &mut Vec::new());
        assert!(matches!(result, Err(PluginError::NoEntryPoint(name)) if name == "virsh"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_plugin_root() {
        let temp = TempDir::new().unwrap();
        // Arguments reach the entry as separate words
        let entry = "test $# -eq 2 && test \"$1\" = 'a b' && test \"$2\" = -n && true";
        let command = plugin(&temp, Some(entry));
        let status = command
            .run(&[OsString::from("a b"), OsString::from("-n")], false, &mut Vec::new())
            .unwrap();
        assert_eq!(status, Status::Success);

        let command = plugin(&temp, Some("test -f marker.txt"));
        assert_eq!(command.run(&[], false, &mut Vec::new()).unwrap(), Status::Failed);

        std::fs::write(temp.path().join("marker.txt"), "").unwrap();
        assert_eq!(command.run(&[], false, &mut Vec::new()).unwrap(), Status::Success);
    }
}
