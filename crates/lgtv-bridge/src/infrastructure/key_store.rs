//! Pairing client-key persistence.
//!
//! The first successful registration with a TV requires the user to confirm
//! an on-screen prompt; the TV then hands back a `client-key` string.
//! Persisting that key (one file per TV host, inside the configured key
//! directory) lets every later connection re-register without the prompt.
//!
//! This is the only state the bridge keeps on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for key-file operations.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing key file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads the persisted client key, if one exists.
///
/// Returns `None` when the file is missing or empty — both mean "pair from
/// scratch", so they are not errors.
pub fn load(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let key = contents.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Persists a freshly issued client key, creating the key directory if
/// needed.
///
/// # Errors
///
/// Returns [`KeyStoreError::Io`] when the directory cannot be created or the
/// file cannot be written.  The caller logs and carries on — a lost key only
/// means the user sees the pairing prompt again on the next connection.
pub fn store(path: &Path, key: &str) -> Result<(), KeyStoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| KeyStoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, key).map_err(|source| KeyStoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
