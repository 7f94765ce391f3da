//! Error types for dashboard generation.

use camino::Utf8PathBuf;
use thiserror::Error;

use super::panels::PanelSourceError;

/// Errors raised while assembling Grafana dashboards.
#[derive(Debug, Error)]
pub enum GrafanaError {
    /// Raised when two instances of a project share a server address, which
    /// makes the rename-by-address transformation ambiguous.
    #[error(
        "{ip} is already renamed to {existing} in project {project}; cannot also rename it to {instance}"
    )]
    IpCollision {
        /// Project whose transformations were being built.
        project: String,
        /// Address shared by both instances.
        ip: String,
        /// Instance that claimed the address first.
        existing: String,
        /// Instance that collided with it.
        instance: String,
    },
    /// Raised when a generated panel lacks an integer `gridPos.y` or
    /// `gridPos.h`.
    #[error("panel {index} generated for project {project} has no usable gridPos")]
    InvalidGridPos {
        /// Project whose source produced the panel.
        project: String,
        /// Position of the panel within the returned section.
        index: usize,
    },
    /// Raised when a panel source fails.
    #[error("panel source for project {project} failed: {source}")]
    Source {
        /// Project whose source failed.
        project: String,
        /// Error reported by the source.
        #[source]
        source: PanelSourceError,
    },
    /// Raised when panel templates cannot be discovered or parsed.
    #[error("invalid panel template {path}: {message}")]
    Template {
        /// Template file or directory at fault.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}
