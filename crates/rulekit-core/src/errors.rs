//! Typed failure taxonomy shared by the build pipeline and the loader.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure the build pipeline or the bundle loader can surface.
///
/// Stages fail fast: the first error terminates the pipeline without
/// attempting subsequent stages, and no retries are performed anywhere.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Caller-input problem: bad source path, no compilable files, or a
    /// missing archive file.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem read/write failure.
    #[error("io failure on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiler reported one or more ERROR diagnostics. The payload is
    /// the newline-joined message list, preserving the compiler's ordering.
    #[error("rule compilation failed:\n{0}")]
    CompilationFailed(String),

    /// Opaque failure surfaced unchanged from the engine capability.
    #[error("engine failure: {source}")]
    Engine {
        #[source]
        source: anyhow::Error,
    },
}

impl BundleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn engine(source: anyhow::Error) -> Self {
        Self::Engine { source }
    }
}
