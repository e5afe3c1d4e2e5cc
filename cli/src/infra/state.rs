//! Infrastructure implementation of the `IdentityStore` port.
//!
//! `StateFile` reads and writes `.certwatch-state.json` next to the config
//! file, using an atomic write (temp file + rename) so a crash mid-save never
//! leaves a truncated document behind.

use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use crate::application::ports::IdentityStore;
use crate::domain::identity::{IdentityRecord, STATE_FILE_NAME};
use crate::domain::StateError;

/// Identity state file owned by one configuration file.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// State file that belongs to the config at `config_path`.
    ///
    /// A bare file name resolves against the current directory.
    #[must_use]
    pub fn for_config(config_path: &Path) -> Self {
        let dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::with_path(dir.join(STATE_FILE_NAME))
    }

    /// Create a state file handle with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn persist_err(&self, source: std::io::Error) -> StateError {
        StateError::Persist {
            path: self.path.clone(),
            source,
        }
    }

    fn write_atomic(&self, content: &[u8]) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        // NamedTempFile is created with mode 0600 and removed on drop if
        // anything below fails.
        let mut tmp = tempfile::Builder::new()
            .prefix(STATE_FILE_NAME)
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl IdentityStore for StateFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<IdentityRecord>, StateError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StateError::Unreadable {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| StateError::Corrupted {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, record: &IdentityRecord) -> Result<(), StateError> {
        let content = serde_json::to_vec_pretty(record).map_err(StateError::Serialize)?;
        self.write_atomic(&content)
            .map_err(|source| self.persist_err(source))
    }

    fn purge(&self) -> Result<(), StateError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StateError::Purge {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
