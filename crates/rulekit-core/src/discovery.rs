//! Recursive rule-source discovery.

use crate::errors::BundleError;
use std::path::{Path, PathBuf};

/// Classification of a rule source file, derived solely from its file name
/// suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.drl`: directly compilable rule definitions.
    CompiledRule,
    /// `.dsl`: vocabulary mappings for domain-specific rule syntax.
    DialectDefinition,
    /// `.dslr`: rules in domain-specific syntax, expanded via a dialect.
    ExpandedDialectRule,
}

impl SourceKind {
    /// Kind for a file name; `None` for unrecognized suffixes.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".drl") {
            Some(Self::CompiledRule)
        } else if name.ends_with(".dslr") {
            Some(Self::ExpandedDialectRule)
        } else if name.ends_with(".dsl") {
            Some(Self::DialectDefinition)
        } else {
            None
        }
    }

    /// Whether this kind can constitute a buildable bundle. Dialect
    /// definitions alone cannot; they only accompany `.dslr` sources.
    pub fn is_compilable(self) -> bool {
        matches!(self, Self::CompiledRule | Self::ExpandedDialectRule)
    }
}

/// One discovered rule source. Only paths are recorded here; content is read
/// lazily at staging time, so a file deleted between discovery and staging
/// surfaces there.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path on disk.
    pub path: PathBuf,
    /// Path relative to the discovery root.
    pub relative: PathBuf,
    pub kind: SourceKind,
}

/// Recursively discover every recognized rule source under `root`.
///
/// Fails with `InvalidInput` when `root` does not exist or is not a
/// directory. Directory listings are sorted by name before recursion so the
/// manifest order is deterministic for a given filesystem snapshot.
///
/// A listing failure on a subdirectory yields no entries for that subtree
/// rather than failing the walk; discovery tolerates transient filesystem
/// races. Symlink cycles are not guarded against.
pub fn discover(root: &Path) -> Result<Vec<SourceFile>, BundleError> {
    if !root.is_dir() {
        return Err(BundleError::InvalidInput(format!(
            "rules folder does not exist or is not a directory: {}",
            root.display()
        )));
    }

    let mut manifest = Vec::new();
    collect_sources(root, root, &mut manifest)?;
    tracing::debug!(root = %root.display(), sources = manifest.len(), "discovery complete");
    Ok(manifest)
}

fn collect_sources(
    root: &Path,
    dir: &Path,
    out: &mut Vec<SourceFile>,
) -> Result<(), BundleError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if dir == root => return Err(BundleError::io(dir, err)),
        // Subdirectory vanished or became unreadable mid-walk: no entries.
        Err(_) => return Ok(()),
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_sources(root, &path, out)?;
            continue;
        }
        let kind = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(SourceKind::from_file_name);
        if let Some(kind) = kind {
            let relative = match path.strip_prefix(root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };
            out.push(SourceFile {
                path,
                relative,
                kind,
            });
        }
    }
    Ok(())
}
