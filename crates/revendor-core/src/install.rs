//! Driving the package installer.
//!
//! Both entry points shell out to the configured installer with dependency
//! resolution turned off: the requirements lists are expected to pin every
//! transitive dependency explicitly, so anything the installer would resolve
//! on its own is a missing pin.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::VendorConfig;

/// Install every entry of a pinned requirements file into `target`, with no
/// dependency resolution and no bytecode compilation, then strip installer
/// metadata and test/bin directories.
pub fn install_requirements(
    target: &Path,
    requirements: &Path,
    config: &VendorConfig,
) -> Result<()> {
    info!(
        "Installing {} into {}",
        requirements.display(),
        target.display()
    );
    let status = Command::new(&config.pip_command)
        .arg("install")
        .arg("-t")
        .arg(target)
        .arg("-r")
        .arg(requirements)
        .arg("--no-compile")
        .arg("--no-deps")
        .status()
        .with_context(|| format!("Failed to run {}", config.pip_command))?;
    if !status.success() {
        anyhow::bail!(
            "{} install failed for {}",
            config.pip_command,
            requirements.display()
        );
    }
    strip_install_artifacts(target)
}

/// Download every entry of a requirements file as a source distribution
/// into `dest`. No built wheels, no transitive dependencies.
pub fn download_sdists(requirements: &Path, dest: &Path, config: &VendorConfig) -> Result<()> {
    info!("Downloading sdists for {}", requirements.display());
    let status = Command::new(&config.pip_command)
        .arg("download")
        .arg("-r")
        .arg(requirements)
        .arg("--no-binary")
        .arg(":all:")
        .arg("--no-deps")
        .arg("-d")
        .arg(dest)
        .status()
        .with_context(|| format!("Failed to run {}", config.pip_command))?;
    if !status.success() {
        anyhow::bail!(
            "{} download failed for {}",
            config.pip_command,
            requirements.display()
        );
    }
    Ok(())
}

/// Remove installer metadata (`*.dist-info`, `*.egg-info`) and the `bin` and
/// `tests` directories an install leaves at the target root. Missing entries
/// are normal, not an error.
pub fn strip_install_artifacts(target: &Path) -> Result<()> {
    for entry in
        fs::read_dir(target).with_context(|| format!("Failed to read {}", target.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".dist-info") && !name.ends_with(".egg-info") {
            continue;
        }
        let path = entry.path();
        debug!("Removing installer metadata {}", path.display());
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("Failed to remove {}", path.display()))?;
    }

    for unwanted in ["bin", "tests"] {
        let path = target.join(unwanted);
        if path.is_dir() {
            debug!("Dropping {}", path.display());
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}
