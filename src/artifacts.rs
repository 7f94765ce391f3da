//! Whole-file reads and writes for inventory input and generated artifacts.
//!
//! Paths are resolved through `cap-std` by opening the parent directory and
//! addressing the file by name. Parent directories are never created: a
//! missing output directory is reported as an error so the operator notices
//! a misconfigured target instead of writing artifacts somewhere unexpected.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while reading or writing artifact files.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ArtifactError {
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a path cannot name a file.
    #[error("invalid artifact path {path}: {message}")]
    InvalidPath {
        /// Offending path.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a JSON artifact cannot be serialised.
    #[error("failed to serialise {path}: {message}")]
    Serialize {
        /// Destination of the document.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

/// Reads the whole file at `path` as UTF-8 text.
///
/// # Errors
///
/// Returns [`ArtifactError::Io`] when the parent directory or the file cannot
/// be opened or read.
pub fn read_to_string(path: &Utf8Path) -> Result<String, ArtifactError> {
    let (dir, file_name) = open_parent(path)?;
    dir.read_to_string(file_name)
        .map_err(|err| ArtifactError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

/// Truncates and rewrites the file at `path` with `contents`.
///
/// # Errors
///
/// Returns [`ArtifactError::Io`] when the parent directory does not exist or
/// the write fails.
pub fn write(path: &Utf8Path, contents: impl AsRef<[u8]>) -> Result<(), ArtifactError> {
    let (dir, file_name) = open_parent(path)?;
    dir.write(file_name, contents)
        .map_err(|err| ArtifactError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

/// Serialises `document` as compact JSON and writes it to `path`.
///
/// # Errors
///
/// Returns [`ArtifactError::Serialize`] when serialisation fails and the
/// errors of [`write`].
pub fn write_json<T: Serialize>(path: &Utf8Path, document: &T) -> Result<(), ArtifactError> {
    let rendered = serde_json::to_string(document).map_err(|err| ArtifactError::Serialize {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    write(path, rendered)
}

fn open_parent(path: &Utf8Path) -> Result<(Dir, &str), ArtifactError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| ArtifactError::InvalidPath {
            path: path.to_path_buf(),
            message: String::from("path is missing a filename"),
        })?;

    let dir =
        Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| ArtifactError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        })?;
    Ok((dir, file_name))
}
