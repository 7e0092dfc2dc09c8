//! Loading referenced documents.

use std::path::PathBuf;

use crate::error::ReferenceError;
use crate::types::DocumentId;

/// Maximum referenced file size (16 MiB).
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Source of document text by identity. Every call loads afresh; nothing is cached.
pub trait DocumentLoader {
    /// Load the full text of a document.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::FileNotFound` when the document cannot be read,
    /// or `ReferenceError::FileTooLarge` when it exceeds the loader's limit.
    fn load(&self, id: &DocumentId) -> Result<String, ReferenceError>;
}

/// Reads documents from the local filesystem.
#[derive(Debug, Clone)]
pub struct FsLoader {
    /// Largest file accepted, in bytes.
    max_bytes: u64,
}

impl FsLoader {
    /// A loader with the default size limit.
    pub const fn new() -> Self {
        return Self {
            max_bytes: MAX_FILE_SIZE,
        };
    }

    /// A loader with a custom size limit.
    #[cfg(test)]
    pub const fn with_max_bytes(max_bytes: u64) -> Self {
        return Self { max_bytes };
    }
}

impl Default for FsLoader {
    fn default() -> Self {
        return Self::new();
    }
}

impl DocumentLoader for FsLoader {
    fn load(&self, id: &DocumentId) -> Result<String, ReferenceError> {
        let not_found = || {
            return ReferenceError::FileNotFound {
                file_part: String::new(),
                path: id.path().to_path_buf(),
            };
        };

        let size_bytes = std::fs::metadata(id.path()).map_err(|_err| return not_found())?.len();
        if size_bytes > self.max_bytes {
            return Err(ReferenceError::FileTooLarge {
                max_bytes: self.max_bytes,
                path: PathBuf::from(id.path()),
                size_bytes,
            });
        }
        tracing::trace!(path = %id, size_bytes, "loading document");
        return std::fs::read_to_string(id.path()).map_err(|_err| return not_found());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "{}").unwrap();
        let text = FsLoader::new().load(&DocumentId::new(&path)).unwrap();
        assert_eq!(text, "{}");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsLoader::new()
            .load(&DocumentId::new(dir.path().join("missing.json")))
            .unwrap_err();
        assert!(matches!(err, ReferenceError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsLoader::new().load(&DocumentId::new(dir.path())).unwrap_err();
        assert!(matches!(err, ReferenceError::FileNotFound { .. }));
    }

    #[test]
    fn rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");
        std::fs::write(&path, "[1, 2, 3, 4]").unwrap();
        let err = FsLoader::with_max_bytes(4)
            .load(&DocumentId::new(&path))
            .unwrap_err();
        assert!(matches!(err, ReferenceError::FileTooLarge { size_bytes: 12, max_bytes: 4, .. }));
    }
}
