//! Regeneration of `.pyi` re-export stubs.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use revendor_core::paths::VendorRoot;
use revendor_core::{VendorConfig, paths, stubs};

#[derive(Args)]
pub struct StubsArgs {}

pub fn execute(_args: StubsArgs) -> Result<()> {
    let repo_root = paths::repo_root()?;
    let config = VendorConfig::load(&repo_root)?;
    let vendor = VendorRoot::vendor(&repo_root, &config);

    stubs::update_stubs(&vendor, &config)?;

    println!("{} Stubs updated", "✓".green());
    Ok(())
}
