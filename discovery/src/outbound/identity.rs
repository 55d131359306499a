//! Anonymous device identity persisted in a small file.
//!
//! The first call generates a random id and stores it; later calls and later
//! sessions reuse it, so a device keeps one author id across restarts.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ReviewAuthor;
use crate::domain::ports::IdentityProvider;

/// File name holding the persisted id.
pub const IDENTITY_FILE_NAME: &str = "device-id";

/// Identity provider backed by a file in one directory.
pub struct FileBackedIdentity {
    directory: PathBuf,
    author: OnceCell<Option<ReviewAuthor>>,
}

impl FileBackedIdentity {
    /// Provider storing its id under `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            author: OnceCell::new(),
        }
    }

    fn resolve(&self) -> Option<ReviewAuthor> {
        let dir = match open_directory(&self.directory) {
            Ok(dir) => dir,
            Err(error) => {
                warn!(directory = %self.directory.display(), %error, "identity directory unavailable");
                return None;
            }
        };

        match dir.read_to_string(IDENTITY_FILE_NAME) {
            Ok(stored) if !stored.trim().is_empty() => {
                return Some(ReviewAuthor::anonymous(stored.trim()));
            }
            Ok(_) => debug!("identity file empty; generating a new id"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("no identity file yet; generating a new id");
            }
            Err(error) => {
                warn!(%error, "identity file unreadable");
                return None;
            }
        }

        let id = Uuid::new_v4().to_string();
        if let Err(error) = dir.write(IDENTITY_FILE_NAME, id.as_bytes()) {
            warn!(%error, "could not persist identity; using it for this session only");
        }
        Some(ReviewAuthor::anonymous(id))
    }
}

fn open_directory(path: &Path) -> io::Result<Dir> {
    Dir::create_ambient_dir_all(path, ambient_authority())?;
    Dir::open_ambient_dir(path, ambient_authority())
}

#[async_trait]
impl IdentityProvider for FileBackedIdentity {
    async fn current_author(&self) -> Option<ReviewAuthor> {
        self.author
            .get_or_init(|| async { self.resolve() })
            .await
            .clone()
    }
}
