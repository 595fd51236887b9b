//! End-to-end re-vendoring of both dependency trees.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use log::info;
use revendor_core::paths::VendorRoot;
use revendor_core::{VendorConfig, clean, detect, install, licenses, patch, paths, rewrite};

#[derive(Args)]
pub struct UpdateArgs {}

pub fn execute(_args: UpdateArgs) -> Result<()> {
    let repo_root = paths::repo_root()?;
    let config = VendorConfig::load(&repo_root)?;
    let vendor = VendorRoot::vendor(&repo_root, &config);
    let patched = VendorRoot::patched(&repo_root, &config);
    info!("Using vendor dir: {}", vendor.path.display());

    clean::clean_vendor(&vendor, &config)?;
    clean::clean_vendor(&patched, &config)?;

    revendor_tree(&vendor, &config)?;
    revendor_patched_tree(&patched, &repo_root, &config)?;

    licenses::download_licenses(&vendor, &config)?;
    licenses::download_licenses(&patched, &config)?;

    println!("{} Re-vendoring complete", "✓".green());
    Ok(())
}

/// Repopulate a vendor root and rewrite its imports.
fn revendor_tree(root: &VendorRoot, config: &VendorConfig) -> Result<()> {
    info!("Reinstalling vendored libraries");
    // Dependency resolution stays off: every transitive dependency has to be
    // pinned in the requirements list itself.
    install::install_requirements(&root.path, &root.requirements_file(config), config)?;

    let libs = detect::detect_vendored_libs(&root.path, config)?;
    info!("Detected vendored libraries: {}", libs.join(", "));

    info!("Rewriting all imports related to vendored libs");
    rewrite::rewrite_all(root, &libs, config)
}

/// Same as the vendor pass, plus stored patches applied before rewriting.
fn revendor_patched_tree(
    root: &VendorRoot,
    repo_root: &Path,
    config: &VendorConfig,
) -> Result<()> {
    info!("Reinstalling patched libraries");
    install::install_requirements(&root.path, &root.requirements_file(config), config)?;

    let libs = detect::detect_vendored_libs(&root.path, config)?;
    info!("Detected vendored libraries: {}", libs.join(", "));

    info!("Applying patches");
    patch::apply_patches(repo_root, &repo_root.join(&config.patch_dir))?;

    info!("Rewriting all imports related to vendored libs");
    rewrite::rewrite_all(root, &libs, config)
}
