//! Prometheus scrape configuration generation.
//!
//! The generated file is complete: a fixed global section followed by a
//! single `hosts` job that scrapes the healthcheck exporter on every server.

use std::collections::BTreeSet;

use crate::inventory::Inventory;

/// Port of the healthcheck exporter running on every server.
pub const DEFAULT_HEALTHCHECK_PORT: u16 = 9977;

const PREAMBLE: &str = r#"# my global config
global:
  scrape_interval:     120s # Set the scrape interval to every 15 seconds. Default is every 1 minute.
  evaluation_interval: 120s # Evaluate rules every 15 seconds. The default is every 1 minute.
  # scrape_timeout is set to the global default (10s).

# Alertmanager configuration
alerting:
  alertmanagers:
  - static_configs:
    - targets:
      # - alertmanager:9093

# Load rules once and periodically evaluate them according to the global 'evaluation_interval'.
rule_files:
  # - "first_rules.yml"
  # - "second_rules.yml"

scrape_configs:
"#;

/// Renders the whole Prometheus configuration file.
#[must_use]
pub fn render(inventory: &Inventory, healthcheck_port: u16) -> String {
    let targets = inventory
        .servers()
        .iter()
        .map(|server| quoted_target(&server.ip, healthcheck_port));
    format!("{PREAMBLE}{}", scrape_job("hosts", targets))
}

/// Renders a scrape job for one project's servers on `port`.
///
/// Targets are deduplicated and sorted. The generator does not emit these
/// jobs yet; per-project exporters are scraped by hand until their ports are
/// recorded in the inventory.
#[must_use]
pub fn project_job(inventory: &Inventory, project: &str, port: u16) -> String {
    let targets: BTreeSet<String> = inventory
        .placements_in_project(project)
        .map(|(_, server)| quoted_target(&server.ip, port))
        .collect();
    scrape_job(project, targets)
}

/// Number of targets in the `hosts` job.
#[must_use]
pub fn target_count(inventory: &Inventory) -> usize {
    inventory.servers().len()
}

fn quoted_target(ip: &str, port: u16) -> String {
    format!("'{ip}:{port}'")
}

fn scrape_job(name: &str, targets: impl IntoIterator<Item = String>) -> String {
    let joined = targets.into_iter().collect::<Vec<_>>().join(", ");
    format!(
        "\n  - job_name: '{name}'\n    static_configs:\n      - targets: [{joined}]\n"
    )
}
