//! Import rewriting for vendored source trees.
//!
//! After installation, every vendored library still imports its siblings by
//! their bare top-level names. This pass rewrites `import x` and
//! `from x import ...` statements so that references to vendored names
//! resolve through the nested `.vendor` package instead, renaming mapped
//! library directories on disk before descending into them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

use crate::config::VendorConfig;
use crate::detect::detect_vendored_libs;
use crate::paths::VendorRoot;

/// Compiled substitution rules for one detected library set.
pub struct ImportRewriter {
    rules: Vec<RewriteRule>,
}

struct RewriteRule {
    bare: Regex,
    bare_replacement: String,
    from: Regex,
    from_replacement: String,
}

impl ImportRewriter {
    /// Compile rewrite rules for a library set.
    ///
    /// Longer names are substituted first, and the `from` pattern requires
    /// the name to be the full dotted first segment (followed by `.` or
    /// whitespace), so one vendored name that prefixes another can never
    /// steal or corrupt the longer match.
    pub fn new(libs: &[String]) -> Result<Self> {
        let mut ordered: Vec<&String> = libs.iter().collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        // Start and end of text count as line boundaries, so a module whose
        // very first or last line is an import is still rewritten.
        let mut rules = Vec::with_capacity(ordered.len());
        for lib in ordered {
            let escaped = regex::escape(lib);
            rules.push(RewriteRule {
                bare: Regex::new(&format!(r"(\n\s*|^)import {escaped}(\n\s*|\z)"))?,
                bare_replacement: format!("${{1}}from .vendor import {lib}${{2}}"),
                from: Regex::new(&format!(r"(\n\s*|^)from {escaped}([\s.])"))?,
                from_replacement: format!("${{1}}from .vendor.{lib}${{2}}"),
            });
        }
        Ok(Self { rules })
    }

    /// Apply every rule once. Idempotent: already-relocated imports no
    /// longer match either pattern.
    pub fn rewrite_text(&self, text: &str) -> String {
        let mut text = text.to_string();
        for rule in &self.rules {
            text = rule
                .bare
                .replace_all(&text, rule.bare_replacement.as_str())
                .into_owned();
            text = rule
                .from
                .replace_all(&text, rule.from_replacement.as_str())
                .into_owned();
        }
        text
    }

    /// Rewrite one source file in place.
    pub fn rewrite_file(&self, file: &Path) -> Result<()> {
        let text = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let rewritten = self.rewrite_text(&text);
        if rewritten != text {
            fs::write(file, rewritten)
                .with_context(|| format!("Failed to rewrite {}", file.display()))?;
        }
        Ok(())
    }
}

/// Rename `dir` on disk if its name has a rename-map entry, returning the
/// path to process. A pre-existing target means the rename already happened
/// on a previous pass.
fn rename_if_mapped(dir: &Path, renames: &BTreeMap<String, String>) -> Result<PathBuf> {
    let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
        return Ok(dir.to_path_buf());
    };
    let Some(new_name) = renames.get(name) else {
        return Ok(dir.to_path_buf());
    };
    let renamed = dir.parent().unwrap_or(Path::new("")).join(new_name);
    if !renamed.exists() {
        debug!("Renaming {} -> {}", dir.display(), renamed.display());
        fs::rename(dir, &renamed)
            .with_context(|| format!("Failed to rename {}", dir.display()))?;
    }
    Ok(renamed)
}

/// Recursively rewrite every `.py` file under `package_dir`, applying
/// on-disk renames before recursing into a mapped directory.
pub fn rewrite_imports(
    package_dir: &Path,
    rewriter: &ImportRewriter,
    renames: &BTreeMap<String, String>,
) -> Result<()> {
    let package_dir = rename_if_mapped(package_dir, renames)?;
    for entry in fs::read_dir(&package_dir)
        .with_context(|| format!("Failed to read {}", package_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            rewrite_imports(&path, rewriter, renames)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("py") {
            rewriter.rewrite_file(&path)?;
        }
    }
    Ok(())
}

/// Rewrite all imports of `libs` under a vendor root.
///
/// Top-level directories are processed recursively (with renames); loose
/// non-whitelisted `.py` modules are rewritten in place. A top-level
/// `backports` namespace package additionally gets one re-export line per
/// nested library appended to its `__init__.py`, so each backport module is
/// importable from the package root.
pub fn rewrite_all(root: &VendorRoot, libs: &[String], config: &VendorConfig) -> Result<()> {
    let rewriter = ImportRewriter::new(libs)?;
    let renames = config.renames_for(root.kind);
    for entry in fs::read_dir(&root.path)
        .with_context(|| format!("Failed to read {}", root.path.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            let dir = rename_if_mapped(&path, renames)?;
            rewrite_imports(&dir, &rewriter, renames)?;
            if dir.file_name().and_then(|n| n.to_str()) == Some("backports") {
                add_backport_reexports(&dir, config)?;
            }
        } else if !config.is_whitelisted(&name) && name.ends_with(".py") {
            rewriter.rewrite_file(&path)?;
        }
    }
    Ok(())
}

/// Append `from . import <lib>` for every library nested under the
/// backports directory to its `__init__.py`.
fn add_backport_reexports(backports_dir: &Path, config: &VendorConfig) -> Result<()> {
    let init = backports_dir.join("__init__.py");
    let nested = detect_vendored_libs(backports_dir, config)?;
    let content = fs::read_to_string(&init)
        .with_context(|| format!("Failed to read {}", init.display()))?;
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    for lib in nested {
        lines.push(format!("from . import {lib}"));
    }
    fs::write(&init, lines.join("\n") + "\n")
        .with_context(|| format!("Failed to rewrite {}", init.display()))?;
    Ok(())
}
