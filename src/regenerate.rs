//! Orchestrates a full regeneration run.
//!
//! The run rewrites the SSH client config and the Ansible inventory below
//! their autogenerated markers, overwrites the Prometheus config, writes one
//! dashboard per owner plus the admin dashboard, and finally makes sure SSH
//! keys are installed on every server. Each stage reads the shared inventory
//! only, so no stage depends on another's output. The first failure aborts
//! the run; artifacts written by earlier stages are left in place.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::info;

use crate::artifacts::{self, ArtifactError};
use crate::grafana::{DashboardBuilder, GrafanaError, PanelRegistry};
use crate::inventory::Inventory;
use crate::preamble;
use crate::provision::{CommandRunner, KeyProvisioner, ProvisionError, ProvisionSummary};
use crate::{ansible, prometheus, ssh_config};

/// Destinations and rendering settings for generated artifacts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputTargets {
    /// OpenSSH client configuration, rewritten below the marker.
    pub ssh_config: Utf8PathBuf,
    /// Ansible inventory, rewritten below the marker.
    pub ansible_inventory: Utf8PathBuf,
    /// Prometheus configuration, overwritten.
    pub prometheus_config: Utf8PathBuf,
    /// Existing directory receiving dashboard JSON files.
    pub grafana_dashboards: Utf8PathBuf,
    /// Marker separating hand-written and generated content.
    pub marker: String,
    /// Healthcheck exporter port.
    pub healthcheck_port: u16,
}

/// Errors surfaced while regenerating artifacts.
#[derive(Debug, Error)]
pub enum RegenerateError {
    /// Raised when the SSH config cannot be read or written.
    #[error("failed to regenerate SSH config: {0}")]
    SshConfig(#[source] ArtifactError),
    /// Raised when the Ansible inventory cannot be read or written.
    #[error("failed to regenerate Ansible inventory: {0}")]
    Ansible(#[source] ArtifactError),
    /// Raised when the Prometheus config cannot be written.
    #[error("failed to regenerate Prometheus config: {0}")]
    Prometheus(#[source] ArtifactError),
    /// Raised when dashboards cannot be assembled.
    #[error("failed to build Grafana dashboards: {0}")]
    Dashboards(#[from] GrafanaError),
    /// Raised when a dashboard file cannot be written.
    #[error("failed to write Grafana dashboard: {0}")]
    DashboardWrite(#[source] ArtifactError),
    /// Raised when key provisioning fails.
    #[error("SSH key check failed: {0}")]
    Provision(#[from] ProvisionError),
}

/// Counts reported after a regeneration run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RegenerationSummary {
    /// `Host` blocks written to the SSH config.
    pub ssh_hosts: usize,
    /// Groups written to the Ansible inventory.
    pub inventory_groups: usize,
    /// Targets of the Prometheus `hosts` job.
    pub scrape_targets: usize,
    /// Dashboard files written, admin included.
    pub dashboards: usize,
    /// Key provisioning counts; `None` when the check was disabled.
    pub keys: Option<ProvisionSummary>,
}

/// Runs every generator followed by key provisioning.
#[derive(Debug)]
pub struct Regenerator<R: CommandRunner> {
    targets: OutputTargets,
    registry: PanelRegistry,
    provisioner: KeyProvisioner<R>,
    check_keys: bool,
}

impl<R: CommandRunner> Regenerator<R> {
    /// Creates a regenerator writing to `targets`.
    #[must_use]
    pub const fn new(
        targets: OutputTargets,
        registry: PanelRegistry,
        provisioner: KeyProvisioner<R>,
    ) -> Self {
        Self {
            targets,
            registry,
            provisioner,
            check_keys: true,
        }
    }

    /// Disables or re-enables the trailing key check.
    #[must_use]
    pub const fn with_key_check(mut self, enabled: bool) -> Self {
        self.check_keys = enabled;
        self
    }

    /// Regenerates every artifact from `inventory`.
    ///
    /// # Errors
    ///
    /// Returns [`RegenerateError`] naming the stage that failed.
    pub fn execute(&self, inventory: &Inventory) -> Result<RegenerationSummary, RegenerateError> {
        let mut summary = RegenerationSummary {
            ssh_hosts: self.write_ssh_config(inventory)?,
            inventory_groups: self.write_ansible_inventory(inventory)?,
            scrape_targets: self.write_prometheus_config(inventory)?,
            dashboards: self.write_dashboards(inventory)?,
            keys: None,
        };
        if self.check_keys {
            summary.keys = Some(self.provisioner.provision(inventory)?);
        }
        Ok(summary)
    }

    fn write_ssh_config(&self, inventory: &Inventory) -> Result<usize, RegenerateError> {
        let path = &self.targets.ssh_config;
        self.rewrite_below_marker(path, &ssh_config::render(inventory))
            .map_err(RegenerateError::SshConfig)?;
        let hosts = ssh_config::host_count(inventory);
        info!(path = %path, hosts, "wrote SSH config");
        Ok(hosts)
    }

    fn write_ansible_inventory(&self, inventory: &Inventory) -> Result<usize, RegenerateError> {
        let path = &self.targets.ansible_inventory;
        self.rewrite_below_marker(path, &ansible::render(inventory))
            .map_err(RegenerateError::Ansible)?;
        let groups = ansible::group_count(inventory);
        info!(path = %path, groups, "wrote Ansible inventory");
        Ok(groups)
    }

    fn write_prometheus_config(&self, inventory: &Inventory) -> Result<usize, RegenerateError> {
        let path = &self.targets.prometheus_config;
        artifacts::write(
            path,
            prometheus::render(inventory, self.targets.healthcheck_port),
        )
        .map_err(RegenerateError::Prometheus)?;
        let targets = prometheus::target_count(inventory);
        info!(path = %path, targets, "wrote Prometheus config");
        Ok(targets)
    }

    fn write_dashboards(&self, inventory: &Inventory) -> Result<usize, RegenerateError> {
        let builder = DashboardBuilder::new(inventory, &self.registry);
        let mut dashboards = builder.owner_dashboards()?;
        dashboards.push(builder.admin_dashboard()?);

        for dashboard in &dashboards {
            let path = self.targets.grafana_dashboards.join(dashboard.file_name());
            artifacts::write_json(&path, &dashboard.to_json())
                .map_err(RegenerateError::DashboardWrite)?;
            info!(path = %path, panels = dashboard.panels().len(), "wrote Grafana dashboard");
        }
        Ok(dashboards.len())
    }

    fn rewrite_below_marker(&self, path: &Utf8Path, generated: &str) -> Result<(), ArtifactError> {
        let mut contents = preamble::read_preamble(path, &self.targets.marker)?;
        contents.push_str(generated);
        artifacts::write(path, contents)
    }
}
