//! Build-time virtual filesystem assembly.

use crate::descriptor;
use crate::discovery::SourceFile;
use crate::errors::BundleError;
use std::collections::BTreeMap;

/// Mapping from canonical POSIX in-archive path to byte content. Built fresh
/// per compile invocation and discarded after compilation.
#[derive(Debug, Default)]
pub struct StagedFilesystem {
    entries: BTreeMap<String, Vec<u8>>,
}

impl StagedFilesystem {
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(path.into(), bytes);
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(path, bytes)| (path.as_str(), bytes.as_slice()))
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, Vec<u8>)> {
        self.entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stage the module descriptor plus every manifest entry under `prefix`.
///
/// Source content is read here, not at discovery time, so a file deleted in
/// between surfaces as an `Io` failure from this stage. A manifest with
/// nothing compilable (only dialect definitions, or nothing at all) is
/// rejected before any file is read.
pub fn stage(manifest: &[SourceFile], prefix: &str) -> Result<StagedFilesystem, BundleError> {
    if !manifest.iter().any(|source| source.kind.is_compilable()) {
        return Err(BundleError::InvalidInput(
            "no compilable rule files".to_string(),
        ));
    }

    let mut staged = StagedFilesystem::default();
    staged.insert(
        descriptor::DESCRIPTOR_PATH,
        descriptor::module_descriptor().as_bytes().to_vec(),
    );

    for source in manifest {
        let bytes =
            std::fs::read(&source.path).map_err(|err| BundleError::io(&source.path, err))?;
        let relative = source.relative.to_string_lossy().replace('\\', "/");
        staged.insert(format!("{prefix}/{relative}"), bytes);
        tracing::debug!(path = %source.path.display(), "staged rule source");
    }

    Ok(staged)
}
