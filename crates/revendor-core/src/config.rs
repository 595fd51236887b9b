use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::paths::RootKind;

/// File name of the optional per-repository configuration override.
pub const CONFIG_FILE: &str = "revendor.toml";

/// Control files that survive cleaning and are never treated as vendored
/// modules.
const DEFAULT_FILE_WHITELIST: &[&str] = &[
    "Makefile",
    "vendor.txt",
    "patched.txt",
    "__init__.py",
    "README.rst",
    "appdirs.py",
];

/// On-disk directory renames applied to the vendor tree.
const DEFAULT_RENAMES: &[(&str, &str)] = &[("pip", "pip9")];

/// On-disk directory renames applied to the patched tree.
const DEFAULT_PATCHED_RENAMES: &[(&str, &str)] = &[("pip", "notpip")];

/// Distributions whose package name differs from their installed location.
const DEFAULT_OVERRIDES: &[(&str, &str)] = &[
    ("requirements-parser", "requirements"),
    (
        "backports.shutil_get_terminal_size",
        "backports/shutil_get_terminal_size",
    ),
    ("backports.weakref", "backports/weakref"),
    ("shutil_backports", "backports/shutil_get_terminal_size"),
    ("python-dotenv", "dotenv"),
    ("pip-tools", "piptools"),
];

// From time to time, remove the entries that are no longer needed.
const DEFAULT_LICENSE_FALLBACK_URLS: &[(&str, &str)] = &[
    ("pytoml", "https://github.com/avakar/pytoml/raw/master/LICENSE"),
    (
        "delegator.py",
        "https://raw.githubusercontent.com/kennethreitz/delegator.py/master/LICENSE",
    ),
    (
        "click-didyoumean",
        "https://raw.githubusercontent.com/click-contrib/click-didyoumean/master/LICENSE",
    ),
    (
        "click-completion",
        "https://raw.githubusercontent.com/click-contrib/click-completion/master/LICENSE",
    ),
    (
        "blindspin",
        "https://raw.githubusercontent.com/kennethreitz/delegator.py/master/LICENSE",
    ),
    (
        "shutilwhich",
        "https://raw.githubusercontent.com/mbr/shutilwhich/master/LICENSE",
    ),
    (
        "parse",
        "https://raw.githubusercontent.com/techalchemy/parse/master/LICENSE",
    ),
    (
        "semver",
        "https://raw.githubusercontent.com/k-bx/python-semver/master/LICENSE.txt",
    ),
    (
        "crayons",
        "https://raw.githubusercontent.com/kennethreitz/crayons/master/LICENSE",
    ),
    (
        "pip-tools",
        "https://raw.githubusercontent.com/jazzband/pip-tools/master/LICENSE",
    ),
    (
        "pew",
        "https://raw.githubusercontent.com/berdario/pew/master/LICENSE",
    ),
];

/// Fixed configuration for a re-vendoring run.
///
/// Every mapping is plain data passed into the components that consume it,
/// so tests can substitute fixtures. The shipped defaults match the vendor
/// trees this tool currently maintains; any field can be overridden from a
/// `revendor.toml` at the repository root.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorConfig {
    /// Repository-relative path of the vendor tree.
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,

    /// Repository-relative path of the patched tree.
    #[serde(default = "default_patched_dir")]
    pub patched_dir: String,

    /// Requirements list file inside the vendor tree.
    #[serde(default = "default_vendor_requirements")]
    pub vendor_requirements: String,

    /// Requirements list file inside the patched tree.
    #[serde(default = "default_patched_requirements")]
    pub patched_requirements: String,

    /// Repository-relative directory holding `*.patch` files for the
    /// patched tree.
    #[serde(default = "default_patch_dir")]
    pub patch_dir: String,

    /// Installer executable used for `install` and `download`.
    #[serde(default = "default_pip_command")]
    pub pip_command: String,

    /// Top-level files preserved by the cleaner and ignored by the detector.
    #[serde(default = "default_file_whitelist")]
    pub file_whitelist: Vec<String>,

    /// On-disk library renames for the vendor tree.
    #[serde(default = "default_renames")]
    pub renames: BTreeMap<String, String>,

    /// On-disk library renames for the patched tree.
    #[serde(default = "default_patched_renames")]
    pub patched_renames: BTreeMap<String, String>,

    /// Distribution name -> installed relative path, for distributions whose
    /// package name diverges from their on-disk location.
    #[serde(default = "default_overrides")]
    pub overrides: BTreeMap<String, String>,

    /// Distribution name (substring match) -> direct license download URL,
    /// used only when an sdist ships no license file.
    #[serde(default = "default_license_fallback_urls")]
    pub license_fallback_urls: BTreeMap<String, String>,

    /// Stub overrides: an empty selector list suppresses the `.pyi` stub
    /// entirely; dotted selectors produce a structured multi-file stub set.
    #[serde(default = "default_extra_stubs")]
    pub extra_stubs: BTreeMap<String, Vec<String>>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            vendor_dir: default_vendor_dir(),
            patched_dir: default_patched_dir(),
            vendor_requirements: default_vendor_requirements(),
            patched_requirements: default_patched_requirements(),
            patch_dir: default_patch_dir(),
            pip_command: default_pip_command(),
            file_whitelist: default_file_whitelist(),
            renames: default_renames(),
            patched_renames: default_patched_renames(),
            overrides: default_overrides(),
            license_fallback_urls: default_license_fallback_urls(),
            extra_stubs: default_extra_stubs(),
        }
    }
}

impl VendorConfig {
    /// Load configuration for a repository, falling back to the shipped
    /// defaults when no `revendor.toml` is present.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let config_path = repo_root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// The rename map appropriate to a vendor root.
    pub fn renames_for(&self, kind: RootKind) -> &BTreeMap<String, String> {
        match kind {
            RootKind::Vendor => &self.renames,
            RootKind::Patched => &self.patched_renames,
        }
    }

    pub fn is_whitelisted(&self, file_name: &str) -> bool {
        self.file_whitelist.iter().any(|f| f == file_name)
    }
}

fn default_vendor_dir() -> String {
    "vendor".to_string()
}

fn default_patched_dir() -> String {
    "patched".to_string()
}

fn default_vendor_requirements() -> String {
    "vendor.txt".to_string()
}

fn default_patched_requirements() -> String {
    "patched.txt".to_string()
}

fn default_patch_dir() -> String {
    "patches".to_string()
}

fn default_pip_command() -> String {
    "pip".to_string()
}

fn default_file_whitelist() -> Vec<String> {
    DEFAULT_FILE_WHITELIST.iter().map(|s| s.to_string()).collect()
}

fn string_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_renames() -> BTreeMap<String, String> {
    string_map(DEFAULT_RENAMES)
}

fn default_patched_renames() -> BTreeMap<String, String> {
    string_map(DEFAULT_PATCHED_RENAMES)
}

fn default_overrides() -> BTreeMap<String, String> {
    string_map(DEFAULT_OVERRIDES)
}

fn default_license_fallback_urls() -> BTreeMap<String, String> {
    string_map(DEFAULT_LICENSE_FALLBACK_URLS)
}

fn default_extra_stubs() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        // six needs more than a flat <name>.pyi stub.
        (
            "six".to_string(),
            vec!["six.__init__".to_string(), "six.moves".to_string()],
        ),
        // Single-file modules get no stub at all.
        ("appdirs".to_string(), Vec::new()),
    ])
}
