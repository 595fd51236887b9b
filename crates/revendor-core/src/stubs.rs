//! Generation of `.pyi` re-export stubs for vendored libraries.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use crate::config::VendorConfig;
use crate::detect::detect_vendored_libs;
use crate::paths::VendorRoot;

/// Write a re-export stub for every detected library.
///
/// Libraries without an `extra_stubs` entry get a flat `<lib>.pyi`. An
/// entry with no selectors suppresses the stub (single-file modules);
/// dotted selectors produce a structured stub set, one file per selector,
/// with a trailing `.__init__` stripped from the re-export target.
pub fn update_stubs(root: &VendorRoot, config: &VendorConfig) -> Result<()> {
    let libs = detect_vendored_libs(&root.path, config)?;
    info!("Adding type stubs in {}", root.path.display());

    for lib in libs {
        let Some(selectors) = config.extra_stubs.get(&lib) else {
            let stub = root.path.join(format!("{lib}.pyi"));
            fs::write(&stub, format!("from {lib} import *\n"))
                .with_context(|| format!("Failed to write {}", stub.display()))?;
            continue;
        };

        for selector in selectors {
            let relative: PathBuf = selector.split('.').collect::<PathBuf>();
            let stub = root.path.join(relative.with_extension("pyi"));
            if let Some(parent) = stub.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let target = selector.strip_suffix(".__init__").unwrap_or(selector);
            fs::write(&stub, format!("from {target} import *\n"))
                .with_context(|| format!("Failed to write {}", stub.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::RootKind;

    #[test]
    fn writes_flat_structured_and_suppressed_stubs() {
        let tmp = tempfile::tempdir().unwrap();
        let root = VendorRoot {
            path: tmp.path().to_path_buf(),
            kind: RootKind::Vendor,
        };
        fs::create_dir(root.path.join("requests")).unwrap();
        fs::create_dir(root.path.join("six")).unwrap();
        fs::write(root.path.join("appdirs.py"), "").unwrap();

        let mut config = VendorConfig::default();
        // appdirs is whitelisted by default; drop that so the suppression
        // path is what keeps it stub-free here.
        config.file_whitelist.retain(|f| f != "appdirs.py");

        update_stubs(&root, &config).unwrap();

        assert_eq!(
            fs::read_to_string(root.path.join("requests.pyi")).unwrap(),
            "from requests import *\n"
        );
        assert_eq!(
            fs::read_to_string(root.path.join("six/__init__.pyi")).unwrap(),
            "from six import *\n"
        );
        assert_eq!(
            fs::read_to_string(root.path.join("six/moves.pyi")).unwrap(),
            "from six.moves import *\n"
        );
        assert!(!root.path.join("appdirs.pyi").exists());
        assert!(!root.path.join("six.pyi").exists());
    }
}
