use crate::utils::filesystem::FileSystemError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Reports directory could not be created
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error("Failed to open report file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write report header to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
