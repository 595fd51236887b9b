//! Emptying a vendor root of previously vendored content.

use std::fs;

use anyhow::{Context, Result};
use log::info;

use crate::config::VendorConfig;
use crate::paths::VendorRoot;

/// License files are kept wherever they appear; the harvester owns them.
pub fn is_license_name(name: &str) -> bool {
    name.contains("LICENSE") || name.contains("COPYING")
}

/// Remove every entry of a vendor root except license files and whitelisted
/// control files. Directories are always removed recursively. Idempotent:
/// cleaning an already-clean root is a no-op.
pub fn clean_vendor(root: &VendorRoot, config: &VendorConfig) -> Result<()> {
    info!("Cleaning {}", root.path.display());
    for entry in fs::read_dir(&root.path)
        .with_context(|| format!("Failed to read {}", root.path.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        } else if is_license_name(&name) {
            continue;
        } else if !config.is_whitelisted(&name) {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        } else {
            info!("Skipping {}", path.display());
        }
    }
    Ok(())
}
