pub mod process;

use crate::error::FetchError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Creates `path` (and parents) unless it already is a directory.
pub fn ensure_dir(path: &Path) -> Result<(), FetchError> {
    if path.is_dir() {
        return Ok(());
    }

    info!("Creating download directory {}", path.display());
    std::fs::create_dir_all(path).map_err(|source| FetchError::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}
