//! Binary entry point for the fleetgen CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing::warn;

use fleetgen::{
    ConfigError, FleetgenConfig, GrafanaError, Inventory, InventoryError, KeyProvisioner,
    PanelRegistry, ProcessCommandRunner, ProvisionError, ProvisionSummary, RegenerateError,
    RegenerationSummary, Regenerator,
};

mod cli;
mod logging;

use cli::{Cli, Command, GenerateCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("panel template error: {0}")]
    Panels(#[from] GrafanaError),
    #[error("{0}")]
    Regenerate(#[from] RegenerateError),
    #[error("SSH key check failed: {0}")]
    Provision(#[from] ProvisionError),
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging(&cli.global) {
        write_error(io::stderr(), &err);
    }

    let exit_code = match dispatch(cli.command) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn dispatch(command: Command) -> Result<i32, CliError> {
    let config = FleetgenConfig::load_without_cli_args()?;
    config.validate()?;
    let inventory = Inventory::load(&config.inventory_path())?;
    let provisioner = KeyProvisioner::new(config.ssh_copy_id_bin.clone(), ProcessCommandRunner);

    match command {
        Command::Generate(args) => generate(&config, &inventory, provisioner, &args),
        Command::CheckKeys => {
            let summary = provisioner.provision(&inventory)?;
            write_summary(io::stdout(), &render_key_summary(summary));
            Ok(0)
        }
    }
}

fn generate(
    config: &FleetgenConfig,
    inventory: &Inventory,
    provisioner: KeyProvisioner<ProcessCommandRunner>,
    args: &GenerateCommand,
) -> Result<i32, CliError> {
    let registry = PanelRegistry::discover(&config.panels_dir())?;
    if registry.projects().next().is_none() {
        warn!(dir = %config.grafana_panels_dir, "no panel templates found; dashboards will be empty");
    }
    let regenerator = Regenerator::new(config.output_targets()?, registry, provisioner)
        .with_key_check(!args.skip_key_check);
    let summary = regenerator.execute(inventory)?;
    write_summary(io::stdout(), &render_summary(&summary));
    Ok(0)
}

fn render_summary(summary: &RegenerationSummary) -> String {
    let mut rendered = format!(
        "ssh hosts: {}\ninventory groups: {}\nscrape targets: {}\ndashboards: {}",
        summary.ssh_hosts, summary.inventory_groups, summary.scrape_targets, summary.dashboards
    );
    if let Some(keys) = summary.keys {
        rendered.push('\n');
        rendered.push_str(&render_key_summary(keys));
    }
    rendered
}

fn render_key_summary(summary: ProvisionSummary) -> String {
    format!(
        "servers checked: {}\nservers skipped: {}",
        summary.checked, summary.skipped
    )
}

fn write_summary(mut target: impl Write, summary: &str) {
    writeln!(target, "{summary}").ok();
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &dyn std::fmt::Display) {
    writeln!(target, "{err}").ok();
}
