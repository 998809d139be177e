//! Dependency installation for plugins.

use std::path::Path;
use std::process::Command;

use anyhow::Context;

/// Installs the packages listed in a plugin's dependency file.
pub trait PackageInstaller {
    /// Install every package declared in `path`.
    fn install_from_requirements_file(&self, path: &Path) -> anyhow::Result<()>;
}

/// Installer that shells out to an external package tool.
///
/// The dependency file path is appended after the configured arguments, so
/// the default runs `pip install -r <file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
}

impl CommandInstaller {
    /// Create an installer for an arbitrary program.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// The default `pip install -r` installer.
    pub fn pip() -> Self {
        Self::new("pip", vec!["install".to_string(), "-r".to_string()])
    }

    /// Full command line used for `path`, for display.
    pub fn command_line(&self, path: &Path) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 2);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.push(path.display().to_string());
        parts.join(" ")
    }
}

impl Default for CommandInstaller {
    fn default() -> Self {
        Self::pip()
    }
}

impl PackageInstaller for CommandInstaller {
    fn install_from_requirements_file(&self, path: &Path) -> anyhow::Result<()> {
        tracing::debug!(command = %self.command_line(path), "Running package installer");

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .with_context(|| format!("Failed to run '{}'", self.program))?;

        if !status.success() {
            anyhow::bail!("'{}' exited with {}", self.command_line(path), status);
        }

        Ok(())
    }
}
