use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// File-name pattern of the daemon path stores under the gen cache.
pub const DEFAULT_PATH_DB_PATTERN: &str = "sd*path.db";

/// File-name pattern of the daemon trust stores under the gen cache.
pub const DEFAULT_TRUST_DB_PATTERN: &str = "sd*trust.db";

/// The single entry of `dir` matching `pattern`.
///
/// Zero or several matches are an error.
pub fn default_store_path(dir: &Path, pattern: &str) -> Result<PathBuf, StoreError> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );

    let mut found = Vec::new();
    for entry in glob::glob(&full)? {
        found.push(entry.map_err(|e| StoreError::Io(e.into_error()))?);
    }
    found.sort();

    if found.len() == 1 {
        let path = found.remove(0);
        tracing::debug!(path = %path.display(), "path store located");
        return Ok(path);
    }

    Err(StoreError::AmbiguousStoreLocation {
        pattern: full,
        reason: if found.is_empty() { "no" } else { "more than one" },
        found: found.iter().map(|p| p.display().to_string()).collect(),
    })
}
