//! In-memory collaborators for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::{PackageInstaller, SubmoduleInfo, VersionControl};

/// Version control backend that keeps submodule state in memory.
///
/// When created with [`FakeVcs::in_dir`] it also mirrors checkouts on disk so
/// discovery can see materialized plugins.
pub struct FakeVcs {
    workdir: PathBuf,
    on_disk: bool,
    submodules: Vec<SubmoduleInfo>,
    files: HashMap<PathBuf, Vec<(PathBuf, String)>>,
    installed: RefCell<HashSet<PathBuf>>,
    fail_materialize: HashSet<PathBuf>,
    fail_deinit: HashSet<PathBuf>,
    fail_listing: bool,
    calls: RefCell<Vec<String>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self {
            workdir: PathBuf::from("/fake/host"),
            on_disk: false,
            submodules: Vec::new(),
            files: HashMap::new(),
            installed: RefCell::new(HashSet::new()),
            fail_materialize: HashSet::new(),
            fail_deinit: HashSet::new(),
            fail_listing: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn in_dir(workdir: &Path) -> Self {
        Self { workdir: workdir.to_path_buf(), on_disk: true, ..Self::new() }
    }

    pub fn with_submodule(mut self, name: &str, path: &str) -> Self {
        self.submodules.push(SubmoduleInfo::new(name, path));
        self
    }

    pub fn with_installed(self, path: &str) -> Self {
        self.installed.borrow_mut().insert(PathBuf::from(path));
        self
    }

    /// File written into the submodule checkout when it is materialized.
    pub fn with_file(mut self, path: &str, rel: &str, content: &str) -> Self {
        self.files
            .entry(PathBuf::from(path))
            .or_default()
            .push((PathBuf::from(rel), content.to_string()));
        self
    }

    pub fn failing_materialize(mut self, path: &str) -> Self {
        self.fail_materialize.insert(PathBuf::from(path));
        self
    }

    pub fn failing_deinit(mut self, path: &str) -> Self {
        self.fail_deinit.insert(PathBuf::from(path));
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn is_installed(&self, path: &str) -> bool {
        self.installed.borrow().contains(Path::new(path))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn name_for(&self, path: &Path) -> String {
        self.submodules
            .iter()
            .find(|s| s.path == path)
            .map_or_else(|| path.display().to_string(), |s| s.name.clone())
    }
}

impl VersionControl for FakeVcs {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn list_submodules(&self) -> anyhow::Result<Vec<SubmoduleInfo>> {
        if self.fail_listing {
            anyhow::bail!("could not read .gitmodules");
        }
        Ok(self.submodules.clone())
    }

    fn submodule_working_tree_exists(&self, path: &Path) -> bool {
        self.installed.borrow().contains(path)
    }

    fn materialize_submodule(&self, path: &Path) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(format!("materialize {}", path.display()));

        if self.fail_materialize.contains(path) {
            anyhow::bail!("fetch failed for {}", path.display());
        }

        if self.on_disk {
            let checkout = self.workdir.join(path);
            std::fs::create_dir_all(&checkout)?;
            for (rel, content) in self.files.get(path).into_iter().flatten() {
                let file = checkout.join(rel);
                if let Some(parent) = file.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(file, content)?;
            }
            std::fs::create_dir_all(self.metadata_dir_for(&self.name_for(path)))?;
        }

        self.installed.borrow_mut().insert(path.to_path_buf());
        Ok(())
    }

    fn deinit_submodule(&self, path: &Path) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(format!("deinit {}", path.display()));

        if self.fail_deinit.contains(path) {
            anyhow::bail!("deinit refused for {}", path.display());
        }

        if self.on_disk {
            let checkout = self.workdir.join(path);
            if checkout.exists() {
                std::fs::remove_dir_all(&checkout)?;
            }
            std::fs::create_dir_all(&checkout)?;
        }

        self.installed.borrow_mut().remove(path);
        Ok(())
    }

    fn metadata_dir_for(&self, name: &str) -> PathBuf {
        self.workdir.join(".git").join("modules").join(name)
    }
}

/// Package installer that records the files it was asked to install.
#[derive(Default)]
pub struct FakeInstaller {
    installed: RefCell<Vec<PathBuf>>,
    failing: Vec<String>,
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail for any file whose path contains `fragment`.
    pub fn failing_for(mut self, fragment: &str) -> Self {
        self.failing.push(fragment.to_string());
        self
    }

    pub fn installed(&self) -> Vec<PathBuf> {
        self.installed.borrow().clone()
    }
}

impl PackageInstaller for FakeInstaller {
    fn install_from_requirements_file(&self, path: &Path) -> anyhow::Result<()> {
        let display = path.display().to_string();
        if self.failing.iter().any(|fragment| display.contains(fragment.as_str())) {
            anyhow::bail!("No matching distribution found");
        }
        self.installed.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
