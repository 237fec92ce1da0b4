//! External rule-engine capability.
//!
//! The actual rule compiler and inference engine are not implemented in this
//! crate. They are reached through the narrow build/execute interface below,
//! so the pipeline's own logic (staging, diagnostics aggregation, extraction,
//! loading) stays fully testable against a double. [`stub::StubEngine`] is
//! the in-repo reference implementation used by tests and the CLI.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod stub;

/// Severity of a compiler diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One compiler diagnostic. Produced only by the engine; this crate reads
/// and filters them, never creates them on the build path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

/// Identity handed out by [`RuleEngine::register_module`]. Opaque to this
/// crate beyond equality and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId(pub String);

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The narrow interface onto the external rule engine.
///
/// `Send + Sync` so independent builds and loaders may live on different
/// threads; the engine itself is responsible for any internal locking.
pub trait RuleEngine: Send + Sync {
    /// Open a fresh build session backed by an empty virtual filesystem.
    fn new_build_session(&self) -> Box<dyn BuildSession>;

    /// Register a compiled archive with the engine's module registry.
    fn register_module(&self, bytes: &[u8]) -> anyhow::Result<ModuleId>;

    /// Construct a container bound to a previously registered module.
    fn new_container(&self, id: &ModuleId) -> anyhow::Result<Box<dyn RuleContainer>>;

    /// Process-wide XML parser hardening. The pipeline invokes this at most
    /// once per process, before the first build or registration;
    /// implementations must tolerate being a no-op afterwards.
    fn harden_xml_parsers(&self) {}
}

/// A single-use compile session over a staged virtual filesystem.
pub trait BuildSession {
    /// Stage one file at a canonical in-archive path.
    fn stage(&mut self, path: &str, bytes: Vec<u8>) -> anyhow::Result<()>;

    /// Run the compiler over everything staged so far.
    ///
    /// Always returns the module handle together with the full diagnostic
    /// sequence in the compiler's own order; the handle is only meaningful
    /// when no `Severity::Error` diagnostic is present.
    fn build(self: Box<Self>) -> anyhow::Result<(Box<dyn CompiledModule>, Vec<Diagnostic>)>;
}

/// Opaque serialized form of a successfully built bundle.
pub trait CompiledModule: std::fmt::Debug {
    /// Serialized archive bytes, consumable by [`RuleEngine::register_module`].
    fn bytes(&self) -> anyhow::Result<Vec<u8>>;
}

/// Runtime object bound to one registered module.
pub trait RuleContainer: Send + Sync + std::fmt::Debug {
    /// Fresh, independent evaluation session for the named execution unit.
    /// Fails with the engine's own error when the name is not declared by
    /// the module's descriptor.
    fn new_stateless_session(&self, name: &str) -> anyhow::Result<Box<dyn StatelessSession>>;
}

/// Per-invocation evaluation session; retains no state between calls.
pub trait StatelessSession: std::fmt::Debug {
    /// Evaluate the supplied facts in place. Facts are opaque JSON documents
    /// the engine may mutate as rules fire.
    fn execute(&self, facts: &mut [Value]) -> anyhow::Result<()>;
}
