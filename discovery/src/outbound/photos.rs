//! Photo library reading picker handles from a rooted directory.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};

use crate::domain::PhotoHandle;
use crate::domain::ports::{PhotoLibrary, PhotoLibraryError};

/// Photo library whose handles are paths relative to one directory.
///
/// Handles cannot escape the root: absolute paths and `..` traversal are
/// rejected by the capability-scoped directory handle.
pub struct FilePhotoLibrary {
    root: Dir,
}

impl FilePhotoLibrary {
    /// Open the library rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when `root` cannot be opened as a directory.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = Dir::open_ambient_dir(root.as_ref(), ambient_authority())?;
        Ok(Self { root })
    }
}

#[async_trait]
impl PhotoLibrary for FilePhotoLibrary {
    async fn load(&self, handle: &PhotoHandle) -> Result<Vec<u8>, PhotoLibraryError> {
        match self.root.read(Path::new(handle.as_ref())) {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Err(PhotoLibraryError::not_found(handle.as_ref()))
            }
            Err(error) => Err(PhotoLibraryError::read(format!(
                "{}: {error}",
                handle.as_ref()
            ))),
        }
    }
}
