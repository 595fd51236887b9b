//! Resolution of the two vendor roots relative to the repository.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::VendorConfig;
use crate::git;

/// Which of the two vendor trees a root is. The kind selects the rename map
/// used during rewriting and license destination resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Vendor,
    Patched,
}

/// One of the two directories holding flattened third-party source trees.
#[derive(Debug, Clone)]
pub struct VendorRoot {
    pub path: PathBuf,
    pub kind: RootKind,
}

impl VendorRoot {
    pub fn vendor(repo_root: &Path, config: &VendorConfig) -> Self {
        Self {
            path: repo_root.join(&config.vendor_dir),
            kind: RootKind::Vendor,
        }
    }

    pub fn patched(repo_root: &Path, config: &VendorConfig) -> Self {
        Self {
            path: repo_root.join(&config.patched_dir),
            kind: RootKind::Patched,
        }
    }

    /// The pinned requirements list that populates this root.
    pub fn requirements_file(&self, config: &VendorConfig) -> PathBuf {
        let name = match self.kind {
            RootKind::Vendor => &config.vendor_requirements,
            RootKind::Patched => &config.patched_requirements,
        };
        self.path.join(name)
    }
}

/// Toplevel of the repository containing the current directory. All vendor
/// paths are anchored here so the tool can be invoked from any subdirectory.
pub fn repo_root() -> Result<PathBuf> {
    if !git::is_available() {
        anyhow::bail!("git is required to locate the repository root");
    }
    git::get_repo_root(Path::new(".")).context("Not inside a git repository")
}
