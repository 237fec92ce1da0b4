//! Compile & diagnose: run the external compiler over a staged filesystem
//! and fold its diagnostics into a single outcome.

use crate::engine::{CompiledModule, RuleEngine, Severity};
use crate::errors::BundleError;
use crate::staging::StagedFilesystem;

/// Invoke the engine's compiler against `staged`.
///
/// Aggregation is all-or-nothing: a single ERROR diagnostic anywhere in the
/// bundle fails the whole build with `CompilationFailed`, whose payload is
/// the newline-joined error messages in the compiler's own order. Warnings
/// and infos never fail a build; they are logged and dropped.
pub fn compile(
    engine: &dyn RuleEngine,
    staged: StagedFilesystem,
) -> Result<Box<dyn CompiledModule>, BundleError> {
    let mut session = engine.new_build_session();
    for (path, bytes) in staged.into_entries() {
        session.stage(&path, bytes).map_err(BundleError::engine)?;
    }

    let (module, diagnostics) = session.build().map_err(BundleError::engine)?;

    let errors: Vec<&str> = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.message.as_str())
        .collect();
    if !errors.is_empty() {
        return Err(BundleError::CompilationFailed(errors.join("\n")));
    }

    for diagnostic in &diagnostics {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(message = %diagnostic.message, "compiler warning"),
            _ => tracing::debug!(message = %diagnostic.message, "compiler diagnostic"),
        }
    }

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor;
    use crate::discovery::discover;
    use crate::engine::stub::StubEngine;
    use crate::staging::stage;
    use std::path::Path;

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn staged_tree(files: &[(&str, &str)]) -> (tempfile::TempDir, StagedFilesystem) {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            touch(&dir.path().join(rel), content);
        }
        let manifest = discover(dir.path()).unwrap();
        let staged = stage(&manifest, descriptor::RULES_PREFIX).unwrap();
        (dir, staged)
    }

    #[test]
    fn valid_sources_yield_a_module() {
        let (_dir, staged) = staged_tree(&[(
            "adult.drl",
            "rule \"Mark adult\"\nwhen age >= 18\nthen set adult true\nend\n",
        )]);
        let engine = StubEngine::new();
        let module = compile(&engine, staged).unwrap();
        assert!(!module.bytes().unwrap().is_empty());
    }

    #[test]
    fn error_diagnostics_fail_in_compiler_order() {
        let (_dir, staged) = staged_tree(&[
            ("a.drl", "rule first\nwhen age >=\nend\n"),
            ("z.drl", "rule last\nwhen height nope\nend\n"),
        ]);
        let engine = StubEngine::new();
        let err = compile(&engine, staged).unwrap_err();
        match err {
            BundleError::CompilationFailed(joined) => {
                let lines: Vec<&str> = joined.lines().collect();
                assert_eq!(lines.len(), 2);
                assert!(lines[0].contains("a.drl"));
                assert!(lines[1].contains("z.drl"));
            }
            other => panic!("expected CompilationFailed, got {other:?}"),
        }
    }

    #[test]
    fn one_bad_file_fails_the_whole_bundle() {
        let (_dir, staged) = staged_tree(&[
            (
                "good.drl",
                "rule \"Mark adult\"\nwhen age >= 18\nthen set adult true\nend\n",
            ),
            ("bad.drl", "rule broken\nwhen age >=\nend\n"),
        ]);
        let engine = StubEngine::new();
        assert!(matches!(
            compile(&engine, staged),
            Err(BundleError::CompilationFailed(_))
        ));
    }

    #[test]
    fn warnings_alone_do_not_fail_the_build() {
        // A .dslr with no accompanying .dsl makes the stub warn.
        let (_dir, staged) = staged_tree(&[(
            "expanded.dslr",
            "rule \"Mark adult\"\nwhen age >= 18\nthen set adult true\nend\n",
        )]);
        let engine = StubEngine::new();
        assert!(compile(&engine, staged).is_ok());
    }
}
