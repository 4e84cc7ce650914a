//! Per-invocation scratch directory.
//!
//! Intermediate artifacts (the converted PDF or DOCX, one PNG per page) live
//! in a uniquely named directory owned by a single extraction. The directory
//! is removed when the [`ScratchDir`] is dropped, so early returns through
//! `?` and panics release it as well as the happy path. Two extractions
//! running at once never see each other's files.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// A uniquely named working directory, deleted on drop.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh directory under `root`, or the system temp dir if None.
    pub fn create(root: Option<&Path>) -> Result<Self, ExtractError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docs2text-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| {
            ExtractError::Internal(format!(
                "Failed to create scratch directory under {}: {}",
                root.map(|p| p.display().to_string())
                    .unwrap_or_else(|| std::env::temp_dir().display().to_string()),
                e
            ))
        })?;
        debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the scratch directory.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory now, logging instead of failing if that errors.
    ///
    /// Dropping does the same silently; this exists so the success path
    /// leaves a trace when cleanup goes wrong.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove scratch directory {}: {}", path.display(), e);
        } else {
            debug!("Removed scratch directory {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchDir::create(Some(root.path())).unwrap();
            std::fs::write(scratch.join("page_0.png"), b"x").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn close_removes_contents() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(Some(root.path())).unwrap();
        std::fs::write(scratch.join("converted.pdf"), b"%PDF").unwrap();
        let path = scratch.path().to_path_buf();
        scratch.close();
        assert!(!path.exists());
    }

    #[test]
    fn two_dirs_are_distinct() {
        let a = ScratchDir::create(None).unwrap();
        let b = ScratchDir::create(None).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("docs2text-")));
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = ScratchDir::create(Some(Path::new("/definitely/not/here"))).unwrap_err();
        assert!(matches!(err, ExtractError::Internal(_)));
    }
}
