//! Standalone license harvesting for one vendored tree.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use revendor_core::paths::VendorRoot;
use revendor_core::{VendorConfig, licenses, paths};

#[derive(Args)]
pub struct LicensesArgs {
    /// Harvest for the patched tree instead of the vendor tree
    #[arg(long)]
    pub patched: bool,
}

pub fn execute(args: LicensesArgs) -> Result<()> {
    let repo_root = paths::repo_root()?;
    let config = VendorConfig::load(&repo_root)?;
    let root = if args.patched {
        VendorRoot::patched(&repo_root, &config)
    } else {
        VendorRoot::vendor(&repo_root, &config)
    };

    licenses::download_licenses(&root, &config)?;

    println!(
        "{} Licenses harvested into {}",
        "✓".green(),
        root.path.display()
    );
    Ok(())
}
