//! SSH key provisioning.
//!
//! Every server that does not opt out with `skip-ssh-check` gets an
//! `ssh-copy-id -i <key> <user>@<ip>` run. `ssh-copy-id` is idempotent, so
//! running it on every regeneration only installs keys where they are
//! missing. The first failure aborts the remaining checks.

use std::ffi::OsString;

use shell_escape::unix::escape;
use tracing::{debug, info};

use crate::inventory::{Inventory, Server};

mod command;
mod error;

pub use command::{CommandError, CommandOutput, CommandRunner, ProcessCommandRunner};
pub use error::ProvisionError;

/// Default key-copy program.
pub const DEFAULT_SSH_COPY_ID_BIN: &str = "ssh-copy-id";

/// Counts reported after a provisioning pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProvisionSummary {
    /// Servers whose key check ran successfully.
    pub checked: usize,
    /// Servers skipped because of `skip-ssh-check`.
    pub skipped: usize,
}

/// Runs the key-copy program against every eligible server.
#[derive(Clone, Debug)]
pub struct KeyProvisioner<R: CommandRunner> {
    ssh_copy_id_bin: String,
    runner: R,
}

impl<R: CommandRunner> KeyProvisioner<R> {
    /// Creates a provisioner that runs `ssh_copy_id_bin` through `runner`.
    #[must_use]
    pub fn new(ssh_copy_id_bin: impl Into<String>, runner: R) -> Self {
        Self {
            ssh_copy_id_bin: ssh_copy_id_bin.into(),
            runner,
        }
    }

    /// Builds the argument list for `server`.
    #[must_use]
    pub fn build_args(server: &Server) -> Vec<OsString> {
        vec![
            OsString::from("-i"),
            OsString::from(&server.key),
            OsString::from(format!("{}@{}", server.user, server.ip)),
        ]
    }

    /// Checks every server in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Runner`] when the program cannot be started
    /// and [`ProvisionError::CommandFailure`] when it exits unsuccessfully.
    /// Servers after the failing one are not checked.
    pub fn provision(&self, inventory: &Inventory) -> Result<ProvisionSummary, ProvisionError> {
        let mut summary = ProvisionSummary::default();
        for server in inventory.servers() {
            if server.skip_ssh_check {
                debug!(alias = %server.alias, "skipping key check");
                summary.skipped += 1;
                continue;
            }
            self.check(server)?;
            summary.checked += 1;
        }
        Ok(summary)
    }

    fn check(&self, server: &Server) -> Result<(), ProvisionError> {
        let args = Self::build_args(server);
        info!(
            alias = %server.alias,
            command = %render_command(&self.ssh_copy_id_bin, &args),
            "checking SSH key access"
        );
        let output = self
            .runner
            .run(&self.ssh_copy_id_bin, &args)
            .map_err(|source| ProvisionError::Runner {
                alias: server.alias.clone(),
                source,
            })?;
        for line in output.lines() {
            info!(alias = %server.alias, "{line}");
        }
        if output.is_success() {
            return Ok(());
        }

        Err(ProvisionError::CommandFailure {
            alias: server.alias.clone(),
            program: self.ssh_copy_id_bin.clone(),
            status_text: output.status_text(),
            stderr: output.stderr,
        })
    }
}

fn render_command(program: &str, args: &[OsString]) -> String {
    let mut rendered = escape(program.into()).into_owned();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&escape(arg.to_string_lossy()));
    }
    rendered
}
