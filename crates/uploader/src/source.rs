//! The "get full file bytes + metadata" collaborator.

use std::path::PathBuf;

use chunkferry_transfer::FileSnapshot;

use crate::UploadError;

/// Provides the source file for an upload session.
///
/// The controller calls this once per session, on start; the snapshot
/// is then held in memory until the session completes or is reset.
pub trait FileSource: Send + Sync {
    fn snapshot(&self) -> Result<FileSnapshot, UploadError>;
}

/// [`FileSource`] over an optional filesystem path. An empty source
/// models "no file selected yet".
pub struct PathSource {
    path: Option<PathBuf>,
}

impl PathSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A source with nothing selected; `snapshot` fails.
    pub fn empty() -> Self {
        Self { path: None }
    }
}

impl FileSource for PathSource {
    fn snapshot(&self) -> Result<FileSnapshot, UploadError> {
        let Some(path) = &self.path else {
            return Err(UploadError::NoFileSelected);
        };
        Ok(FileSnapshot::from_path(path)?)
    }
}
