//! Bundle loading: archive on disk → registered module → container →
//! stateless sessions.

use crate::descriptor::DEFAULT_KSESSION;
use crate::engine::{ModuleId, RuleContainer, RuleEngine, StatelessSession};
use crate::errors::BundleError;
use crate::pipeline::ensure_hardened;
use std::path::Path;

/// Loads one compiled bundle archive and hands out stateless execution
/// sessions for the bundle's default execution unit.
///
/// A loader exclusively owns the container it creates; independent archives
/// get independent loaders, and sessions from one loader share no mutable
/// state with each other.
#[derive(Debug)]
pub struct BundleLoader {
    module_id: ModuleId,
    container: Box<dyn RuleContainer>,
}

impl BundleLoader {
    /// Read the archive at `path` and register it with the engine's module
    /// registry. Fails with `InvalidInput` when the file does not exist; the
    /// registration and container construction surface engine failures
    /// unchanged.
    pub fn open(engine: &dyn RuleEngine, path: &Path) -> Result<Self, BundleError> {
        if !path.exists() {
            return Err(BundleError::InvalidInput(format!(
                "bundle archive not found: {}",
                path.display()
            )));
        }
        ensure_hardened(engine);

        let bytes = std::fs::read(path).map_err(|err| BundleError::io(path, err))?;
        let module_id = engine.register_module(&bytes).map_err(BundleError::engine)?;
        let container = engine
            .new_container(&module_id)
            .map_err(BundleError::engine)?;
        tracing::info!(archive = %path.display(), module = %module_id, "bundle loaded");

        Ok(Self {
            module_id,
            container,
        })
    }

    /// Fresh stateless session bound to the default execution unit
    /// (`defaultKSession`). Every call yields an independent session.
    ///
    /// Archives produced by this pipeline always declare that unit; for a
    /// hand-crafted or foreign archive the engine's own failure is surfaced
    /// unchanged.
    pub fn stateless_session(&self) -> Result<Box<dyn StatelessSession>, BundleError> {
        self.container
            .new_stateless_session(DEFAULT_KSESSION)
            .map_err(BundleError::engine)
    }

    /// Identity the engine's registry assigned to this bundle's module.
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    /// Underlying container, for advanced use.
    pub fn container(&self) -> &dyn RuleContainer {
        self.container.as_ref()
    }
}
