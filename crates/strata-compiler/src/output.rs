// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Reading sources and writing assembly files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::CompileError;

pub fn read_source(path: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))
}

/// Write `text` to `path` atomically.
///
/// The text goes to a temporary file next to `path` which is then renamed
/// over it, so readers see either the old file or the complete new one.
pub fn write_assembly(path: &Path, text: &str) -> Result<(), CompileError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CompileError::io(dir, e))?;
    tmp.write_all(text.as_bytes())
        .and_then(|()| tmp.flush())
        .map_err(|e| CompileError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| CompileError::io(path, e.error))?;

    tracing::info!(path = %path.display(), bytes = text.len(), "wrote assembly");
    Ok(())
}
