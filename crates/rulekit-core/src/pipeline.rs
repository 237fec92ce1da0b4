//! The linear build pipeline: discover → stage → compile → extract.

use crate::descriptor::RULES_PREFIX;
use crate::engine::RuleEngine;
use crate::errors::BundleError;
use crate::{compile, discovery, extract, staging};
use once_cell::sync::OnceCell;
use std::path::Path;

/// Summary of one successful bundle build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleOutcome {
    /// Rule source files staged into the bundle.
    pub sources: usize,
    /// Size of the written archive in bytes.
    pub archive_bytes: u64,
}

static XML_HARDENING: OnceCell<()> = OnceCell::new();

/// Apply process-wide XML parser hardening exactly once, before the first
/// engine use. Both the build and load paths funnel through here, so there
/// is no ordering requirement between them.
pub(crate) fn ensure_hardened(engine: &dyn RuleEngine) {
    XML_HARDENING.get_or_init(|| engine.harden_xml_parsers());
}

/// Build a rule bundle from every recognized source under `rules_dir` and
/// write the archive to `output`.
///
/// Each stage fully completes before the next begins; the first failure
/// terminates the pipeline and nothing is written. There is no overlap,
/// no internal parallelism, and no retry anywhere on this path.
pub fn build_bundle(
    engine: &dyn RuleEngine,
    rules_dir: &Path,
    output: &Path,
) -> Result<BundleOutcome, BundleError> {
    ensure_hardened(engine);

    let manifest = discovery::discover(rules_dir)?;
    tracing::info!(
        root = %rules_dir.display(),
        sources = manifest.len(),
        "discovered rule sources"
    );
    let sources = manifest.len();

    let staged = staging::stage(&manifest, RULES_PREFIX)?;
    let module = compile::compile(engine, staged)?;
    let archive_bytes = extract::extract(module, output)?;
    tracing::info!(
        archive = %output.display(),
        bytes = archive_bytes,
        "bundle written"
    );

    Ok(BundleOutcome {
        sources,
        archive_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stub::StubEngine;
    use std::path::Path;

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn build_reports_sources_and_archive_size() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            &dir.path().join("rules/adult.drl"),
            "rule \"Mark adult\"\nwhen age >= 18\nthen set adult true\nend\n",
        );
        let output = dir.path().join("out/bundle.jar");

        let engine = StubEngine::new();
        let outcome = build_bundle(&engine, &dir.path().join("rules"), &output).unwrap();

        assert_eq!(outcome.sources, 1);
        assert_eq!(
            outcome.archive_bytes,
            std::fs::metadata(&output).unwrap().len()
        );
    }

    #[test]
    fn failed_compile_writes_no_archive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("rules/bad.drl"), "rule broken\nnonsense\n");
        let output = dir.path().join("out/bundle.jar");

        let engine = StubEngine::new();
        let err = build_bundle(&engine, &dir.path().join("rules"), &output).unwrap_err();

        assert!(matches!(err, BundleError::CompilationFailed(_)));
        assert!(!output.exists());
    }

    #[test]
    fn hardening_latch_fires_at_most_once() {
        let engine = StubEngine::new();
        let before = engine.harden_count();
        ensure_hardened(&engine);
        let after_first = engine.harden_count();
        ensure_hardened(&engine);
        ensure_hardened(&engine);

        // The latch is process-wide: another test may already have tripped
        // it, in which case this engine never observes a call at all.
        assert!(after_first - before <= 1);
        assert_eq!(engine.harden_count(), after_first);
    }
}
