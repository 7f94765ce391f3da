//! Command-line interface definitions for the `fleetgen` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `fleetgen` binary.
#[derive(Debug, Parser)]
#[command(
    name = "fleetgen",
    about = "Regenerate SSH, Ansible, Prometheus and Grafana configuration from a server inventory",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Flags shared by every subcommand.
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    /// Action to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Logging flags accepted before or after the subcommand.
#[derive(Debug, Args)]
pub(crate) struct GlobalArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub(crate) quiet: bool,
}

/// Subcommands of `fleetgen`.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Regenerate every artifact, then check SSH key access.
    #[command(name = "generate")]
    Generate(GenerateCommand),
    /// Only check SSH key access on every server.
    #[command(name = "check-keys")]
    CheckKeys,
}

/// Arguments for the `fleetgen generate` subcommand.
#[derive(Debug, Args)]
pub(crate) struct GenerateCommand {
    /// Skip running ssh-copy-id after the artifacts are written.
    #[arg(long)]
    pub(crate) skip_key_check: bool,
}
