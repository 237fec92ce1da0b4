//! Archive extraction: persist a compiled module's serialized bytes.

use crate::engine::CompiledModule;
use crate::errors::BundleError;
use std::path::Path;

/// Write the module's archive bytes to `output`, creating missing parent
/// directories first. Returns the number of bytes written.
///
/// The write is a plain overwrite; on failure the destination state is
/// unspecified and no rollback is attempted.
pub fn extract(module: Box<dyn CompiledModule>, output: &Path) -> Result<u64, BundleError> {
    let bytes = module.bytes().map_err(BundleError::engine)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| BundleError::io(parent, err))?;
        }
    }
    std::fs::write(output, &bytes).map_err(|err| BundleError::io(output, err))?;

    Ok(bytes.len() as u64)
}
