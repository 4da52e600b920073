use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileSystemError {
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Filesystem operations the reporter needs from its host
pub trait FileSystemProvider {
    /// Create `path` and any missing parents. Succeeds if it already exists.
    fn make_path(&self, path: &Path) -> Result<(), FileSystemError>;
}

/// `FileSystemProvider` backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystemProvider for LocalFileSystem {
    fn make_path(&self, path: &Path) -> Result<(), FileSystemError> {
        std::fs::create_dir_all(path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => FileSystemError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => FileSystemError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })
    }
}
