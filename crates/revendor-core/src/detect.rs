//! Detection of the library set currently present under a vendor root.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::clean::is_license_name;
use crate::config::VendorConfig;

/// Names of the top-level libraries under `dir`: directories count as
/// packages, `.py` files as single-file modules. License files, `.pyi`
/// stubs, and whitelisted control files are excluded.
///
/// Iteration order is directory order; callers treat the result as a set.
/// The set is recomputed after every install and never cached across runs.
pub fn detect_vendored_libs(dir: &Path, config: &VendorConfig) -> Result<Vec<String>> {
    let mut libs = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            libs.push(name);
        } else if is_license_name(&name)
            || config.is_whitelisted(&name)
            || name.ends_with(".pyi")
        {
            continue;
        } else if let Some(stem) = name.strip_suffix(".py") {
            libs.push(stem.to_string());
        }
    }
    Ok(libs)
}
