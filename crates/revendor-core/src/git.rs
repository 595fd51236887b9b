//! Thin wrappers around the `git` binary.
//!
//! Version control is used for exactly two things: anchoring every vendor
//! path at the repository root, and applying stored patches against the
//! working tree.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Result;

fn git(repo_root: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo_root);
    cmd
}

fn run_stdout(mut cmd: Command) -> Result<String> {
    let out = cmd.output()?;
    if out.status.success() {
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&out.stderr);
        anyhow::bail!("git command failed: {}", stderr.trim())
    }
}

/// Toplevel of the repository containing `path`.
pub fn get_repo_root(path: &Path) -> Result<PathBuf> {
    run_stdout({
        let mut cmd = git(path);
        cmd.args(["rev-parse", "--show-toplevel"]);
        cmd
    })
    .map(PathBuf::from)
}

/// Apply a unified diff against the current working tree.
///
/// Diagnostics stream straight through to the operator; the patch path must
/// therefore be absolute since the caller controls the working directory.
pub fn apply_patch(patch_file: &Path) -> Result<()> {
    let status = Command::new("git")
        .args(["apply", "--verbose"])
        .arg(patch_file)
        .status()?;
    if !status.success() {
        anyhow::bail!("git apply failed for {}", patch_file.display());
    }
    Ok(())
}

pub fn is_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
