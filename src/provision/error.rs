//! Error types for SSH key provisioning.

use thiserror::Error;

use super::command::CommandError;

/// Errors raised while provisioning SSH keys.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProvisionError {
    /// Raised when the key-copy program cannot be started.
    #[error("key check for server {alias} failed to start: {source}")]
    Runner {
        /// Server being checked.
        alias: String,
        /// Underlying runner error.
        #[source]
        source: CommandError,
    },
    /// Raised when the key-copy program exits unsuccessfully.
    #[error("key check for server {alias} failed: {program} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Server being checked.
        alias: String,
        /// Program that was run.
        program: String,
        /// Exit code rendered for humans.
        status_text: String,
        /// Captured standard error.
        stderr: String,
    },
}
