//! Applying stored patches against the repository working tree.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::git;

/// Change the working directory for the lifetime of the guard and restore
/// the previous one on drop, on every exit path including unwinding.
pub struct ScopedChdir {
    previous: PathBuf,
}

impl ScopedChdir {
    pub fn new(dir: &Path) -> Result<Self> {
        let previous = env::current_dir().context("Failed to read current directory")?;
        env::set_current_dir(dir)
            .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
        Ok(Self { previous })
    }
}

impl Drop for ScopedChdir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(
                "Failed to restore working directory to {}: {}",
                self.previous.display(),
                e
            );
        }
    }
}

/// Apply every `*.patch` under `patch_dir` (sorted) against the working
/// tree, anchored at the repository root. A non-zero apply exit is fatal.
pub fn apply_patches(repo_root: &Path, patch_dir: &Path) -> Result<()> {
    if !patch_dir.is_dir() {
        debug!("No patch directory at {}", patch_dir.display());
        return Ok(());
    }

    let mut patches: Vec<PathBuf> = fs::read_dir(patch_dir)
        .with_context(|| format!("Failed to read {}", patch_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("patch"))
        .collect();
    patches.sort();

    let _guard = ScopedChdir::new(repo_root)?;
    for patch in patches {
        info!(
            "Applying patch {}",
            patch.file_name().unwrap_or_default().to_string_lossy()
        );
        git::apply_patch(&patch)
            .with_context(|| format!("Failed to apply {}", patch.display()))?;
    }
    Ok(())
}
