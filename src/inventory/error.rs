//! Error types for inventory loading.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::artifacts::ArtifactError;

/// Errors raised while loading or validating the inventory document.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum InventoryError {
    /// Raised when the document cannot be read.
    #[error("failed to read inventory: {0}")]
    Read(#[from] ArtifactError),
    /// Raised when the document is not valid YAML or misses required fields.
    #[error("failed to parse inventory {path}: {message}")]
    Parse {
        /// Path of the document being parsed.
        path: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },
    /// Raised when two servers share an alias.
    #[error("server alias {alias} is defined more than once")]
    DuplicateAlias {
        /// Alias that appears more than once.
        alias: String,
    },
    /// Raised when an instance references a server alias that does not exist.
    #[error("instance {instance} references unknown server {alias}")]
    UnknownServer {
        /// Instance holding the dangling reference.
        instance: String,
        /// Alias that could not be resolved.
        alias: String,
    },
}
