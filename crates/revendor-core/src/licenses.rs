//! License harvesting for vendored distributions.
//!
//! Every pinned requirement is downloaded as a source distribution; the
//! archive's member list is scanned for license-like files, which are
//! extracted next to the vendored code. Distributions that ship no license
//! in their sdist fall back to a fixed table of direct download URLs.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::info;
use tempfile::TempDir;

use crate::clean::is_license_name;
use crate::config::VendorConfig;
use crate::install;
use crate::paths::VendorRoot;

const FALLBACK_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Download the sdist of every requirement pinned for `root` and extract
/// its license file(s) into the tree. The download directory is removed on
/// every exit path; a single unresolvable license aborts the harvest.
pub fn download_licenses(root: &VendorRoot, config: &VendorConfig) -> Result<()> {
    let requirements = root.requirements_file(config);
    info!("Downloading licenses for {}", requirements.display());

    let download_dir = TempDir::new().context("Failed to create download directory")?;
    install::download_sdists(&requirements, download_dir.path(), config)?;

    for entry in fs::read_dir(download_dir.path())
        .with_context(|| format!("Failed to read {}", download_dir.path().display()))?
    {
        let entry = entry?;
        extract_license(root, &entry.path(), config)?;
    }
    Ok(())
}

/// Extract license members from one downloaded sdist, falling back to the
/// hardcoded URL table when the archive contains none.
pub fn extract_license(root: &VendorRoot, sdist: &Path, config: &VendorConfig) -> Result<()> {
    let file_name = sdist
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid sdist path: {}", sdist.display()))?;

    let found = if file_name.ends_with(".zip") {
        scan_zip(root, sdist, config)?
    } else if file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz") {
        let file = File::open(sdist)
            .with_context(|| format!("Failed to open {}", sdist.display()))?;
        scan_tar(root, GzDecoder::new(file), config)?
    } else if file_name.ends_with(".tar") {
        let file = File::open(sdist)
            .with_context(|| format!("Failed to open {}", sdist.display()))?;
        scan_tar(root, file, config)?
    } else {
        anyhow::bail!("Unsupported sdist archive type: {file_name}");
    };

    if !found {
        info!("License not found in {file_name}, will download");
        license_fallback(root, file_name, config)?;
    }
    Ok(())
}

fn scan_tar<R: Read>(root: &VendorRoot, reader: R, config: &VendorConfig) -> Result<bool> {
    let mut archive = tar::Archive::new(reader);
    let mut found = false;
    for entry in archive.entries().context("Failed to read tar archive")? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        if !is_license_member(&name) {
            continue;
        }
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read archive member {name}"))?;
        extract_license_member(root, &name, &bytes, config)?;
        found = true;
    }
    Ok(found)
}

fn scan_zip(root: &VendorRoot, sdist: &Path, config: &VendorConfig) -> Result<bool> {
    let file =
        File::open(sdist).with_context(|| format!("Failed to open {}", sdist.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read {}", sdist.display()))?;
    let mut found = false;
    for index in 0..archive.len() {
        let mut member = archive.by_index(index)?;
        let name = member.name().to_string();
        if !is_license_member(&name) {
            continue;
        }
        let mut bytes = Vec::new();
        member
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read archive member {name}"))?;
        extract_license_member(root, &name, &bytes, config)?;
        found = true;
    }
    Ok(found)
}

/// License-like member names, excluding the nested test-fixture licenses
/// some distributions bundle under a test tree.
fn is_license_member(name: &str) -> bool {
    if !is_license_name(name) {
        return false;
    }
    if name.contains("/test") {
        info!("Ignoring {name}");
        return false;
    }
    true
}

/// Write one archive member's bytes to its resolved destination.
fn extract_license_member(
    root: &VendorRoot,
    member_name: &str,
    bytes: &[u8],
    config: &VendorConfig,
) -> Result<()> {
    let member_path = Path::new(member_name);
    let top_level = member_path
        .components()
        .next()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default();
    let libname = libname_from_dir(&top_level);
    let file_name = member_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dest = license_destination(root, &libname, &file_name, config);
    info!("Extracting {} into {}", member_name, dest.display());
    fs::write(&dest, bytes).with_context(|| format!("Failed to write {}", dest.display()))
}

/// Reconstruct a library name from a versioned sdist directory name by
/// keeping the dash-separated tokens before the first one that starts with
/// a digit: `python-dateutil-2.8.1` -> `python-dateutil`.
pub fn libname_from_dir(dirname: &str) -> String {
    let mut parts = Vec::new();
    for part in dirname.split('-') {
        if part.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            break;
        }
        parts.push(part);
    }
    parts.join("-")
}

/// Resolve where a harvested license file lands under the vendor root.
///
/// The checks are ordered; reordering them changes the outcome for
/// libraries that satisfy more than one.
pub fn license_destination(
    root: &VendorRoot,
    libname: &str,
    filename: &str,
    config: &VendorConfig,
) -> PathBuf {
    let normal = root.path.join(libname);
    if normal.is_dir() {
        return normal.join(filename);
    }

    let lowercase = root.path.join(libname.to_lowercase());
    if lowercase.is_dir() {
        return lowercase.join(filename);
    }

    if let Some(renamed) = config.renames_for(root.kind).get(libname) {
        return root.path.join(renamed).join(filename);
    }

    if let Some(override_rel) = config.overrides.get(libname) {
        let override_path = root.path.join(override_rel);
        if !override_path.exists() {
            // Flattened single-file submodules, e.g. backports/weakref.py,
            // get a dotted file name next to their parent package.
            if let (Some(parent), Some(leaf)) =
                (override_path.parent(), override_path.file_name())
            {
                if parent.exists() {
                    return parent.join(format!("{}.{}", leaf.to_string_lossy(), filename));
                }
            }
        }
        return override_path.join(filename);
    }

    // Non-directory modules end up with a flat <lib>.<file> at the root.
    root.path.join(format!("{libname}.{filename}"))
}

/// Download a license from the hardcoded URL table. Keys match as
/// substrings of the sdist file name; no match is fatal.
pub fn license_fallback(root: &VendorRoot, sdist_name: &str, config: &VendorConfig) -> Result<()> {
    for (libname, url) in &config.license_fallback_urls {
        if !sdist_name.contains(libname.as_str()) {
            continue;
        }
        let file_name = url.rsplit('/').next().unwrap_or("LICENSE");
        let dest = license_destination(root, libname, file_name, config);
        info!("Downloading {url}");
        let client = reqwest::blocking::Client::builder()
            .timeout(FALLBACK_REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        let response = client
            .get(url)
            .send()
            .with_context(|| format!("Failed to download {url}"))?;
        if !response.status().is_success() {
            anyhow::bail!("HTTP {} from {}", response.status(), url);
        }
        let body = response.bytes().context("Failed to read response body")?;
        fs::write(&dest, &body)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        return Ok(());
    }
    anyhow::bail!("No hardcoded license URL for {sdist_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn libname_strips_version_suffix() {
        assert_eq!(libname_from_dir("requests-2.25.1"), "requests");
        assert_eq!(libname_from_dir("python-dateutil-2.8.1"), "python-dateutil");
        assert_eq!(libname_from_dir("backports.weakref-1.0.post1"), "backports.weakref");
        assert_eq!(libname_from_dir("six-1.16.0"), "six");
        assert_eq!(libname_from_dir("noversion"), "noversion");
    }

    #[test]
    fn license_members_exclude_test_fixtures() {
        assert!(is_license_member("six-1.16.0/LICENSE"));
        assert!(is_license_member("foo-1.0/COPYING.txt"));
        assert!(!is_license_member("html5lib-1.1/html5lib/tests/testdata/LICENSE"));
        assert!(!is_license_member("six-1.16.0/six.py"));
    }
}
