//! Standalone import rewriting over the vendor tree.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use log::info;
use revendor_core::paths::VendorRoot;
use revendor_core::{VendorConfig, detect, paths, rewrite};

#[derive(Args)]
pub struct RewriteArgs {}

pub fn execute(_args: RewriteArgs) -> Result<()> {
    let repo_root = paths::repo_root()?;
    let config = VendorConfig::load(&repo_root)?;
    let vendor = VendorRoot::vendor(&repo_root, &config);
    info!("Using vendor dir: {}", vendor.path.display());

    let libs = detect::detect_vendored_libs(&vendor.path, &config)?;
    info!("Detected vendored libraries: {}", libs.join(", "));

    info!("Rewriting all imports related to vendored libs");
    rewrite::rewrite_all(&vendor, &libs, &config)?;

    println!("{} Imports rewritten", "✓".green());
    Ok(())
}
