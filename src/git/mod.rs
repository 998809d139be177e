//! Git integration module.
//!
//! Provides host repository discovery and the submodule operations the
//! plugin lifecycle needs. Reads and checkouts go through libgit2; `deinit`
//! has no libgit2 equivalent and runs the `git` command line tool.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use git2::build::CheckoutBuilder;
use git2::{Config, Repository, SubmoduleUpdateOptions};

use crate::plugin::{PluginError, PluginResult, SubmoduleInfo, VersionControl};

/// Git repository wrapper with high-level operations.
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    /// Open a Git repository from the given path.
    ///
    /// This will search up the directory tree to find a Git repository.
    pub fn discover(path: impl AsRef<Path>) -> PluginResult<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "No git repository found");
            PluginError::HostRepositoryNotFound(path.to_path_buf())
        })?;
        Self::from_repo(repo, path)
    }

    /// Open a Git repository at the exact path.
    pub fn open(path: impl AsRef<Path>) -> PluginResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)
            .map_err(|_| PluginError::HostRepositoryNotFound(path.to_path_buf()))?;
        Self::from_repo(repo, path)
    }

    fn from_repo(repo: Repository, path: &Path) -> PluginResult<Self> {
        // Bare repositories have no working tree to hold submodules
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| PluginError::HostRepositoryNotFound(path.to_path_buf()))?;

        Ok(Self { repo, workdir })
    }

    /// Get the repository root path.
    pub fn root(&self) -> &Path {
        &self.workdir
    }

    /// Get the `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Submodule names in the order `.gitmodules` declares them.
    fn declaration_order(&self) -> anyhow::Result<Vec<String>> {
        let path = self.workdir.join(GITMODULES_FILE);
        if !path.is_file() {
            return Ok(Vec::new());
        }

        let config = Config::open(&path).context("Failed to open .gitmodules")?;
        let mut entries = config.entries(Some(r"submodule\..*\.path"))?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let Some(name) = entry.name().and_then(submodule_name_from_key) {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }
}

/// File declaring a repository's submodules.
const GITMODULES_FILE: &str = ".gitmodules";

/// Extract `<name>` from a `submodule.<name>.path` key.
fn submodule_name_from_key(key: &str) -> Option<&str> {
    key.strip_prefix("submodule.")?.strip_suffix(".path")
}

/// Sort submodules by their position in `order`.
///
/// libgit2 reports submodules sorted by name. Undeclared names keep their
/// relative order after the declared ones.
fn sort_by_declaration(submodules: &mut [SubmoduleInfo], order: &[String]) {
    submodules.sort_by_key(|submodule| {
        order.iter().position(|name| *name == submodule.name).unwrap_or(order.len())
    });
}

impl VersionControl for GitRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn list_submodules(&self) -> anyhow::Result<Vec<SubmoduleInfo>> {
        let submodules = self.repo.submodules().context("Failed to read .gitmodules")?;

        let mut infos: Vec<SubmoduleInfo> = submodules
            .iter()
            .map(|submodule| {
                let name = submodule.name().map_or_else(
                    || String::from_utf8_lossy(submodule.name_bytes()).into_owned(),
                    String::from,
                );
                SubmoduleInfo { name, path: submodule.path().to_path_buf() }
            })
            .collect();

        sort_by_declaration(&mut infos, &self.declaration_order()?);
        Ok(infos)
    }

    fn submodule_working_tree_exists(&self, path: &Path) -> bool {
        // An uninitialized submodule leaves an empty directory that does not
        // open as a repository
        Repository::open(self.workdir.join(path)).is_ok()
    }

    fn materialize_submodule(&self, path: &Path) -> anyhow::Result<()> {
        let key = path.to_string_lossy();
        let mut submodule = self
            .repo
            .find_submodule(&key)
            .with_context(|| format!("Submodule '{}' is not declared", key))?;

        submodule.init(true).context("Failed to initialize submodule")?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        let mut options = SubmoduleUpdateOptions::new();
        options.checkout(checkout);

        submodule.update(true, Some(&mut options)).context("Failed to update submodule")?;

        Ok(())
    }

    fn deinit_submodule(&self, path: &Path) -> anyhow::Result<()> {
        let output = Command::new("git")
            .args(["submodule", "deinit", "-f", "--"])
            .arg(path)
            .current_dir(&self.workdir)
            .output()
            .context("Failed to run git")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git submodule deinit failed: {}", stderr.trim());
        }

        Ok(())
    }

    fn metadata_dir_for(&self, name: &str) -> PathBuf {
        self.git_dir().join("modules").join(name)
    }
}

/// Find the working tree root of the repository containing `path`.
pub fn find_host_root(path: &Path) -> Option<PathBuf> {
    GitRepository::discover(path).ok().map(|repo| repo.root().to_path_buf())
}
