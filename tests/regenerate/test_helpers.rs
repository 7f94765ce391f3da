//! Shared fixtures for regeneration BDD scenarios.

use std::sync::Arc;

use fleetgen::test_support::{SAMPLE_INVENTORY, ScriptedRunner};
use fleetgen::{
    Inventory, KeyProvisioner, OutputTargets, PanelRegistry, RegenerateError,
    RegenerationSummary, Regenerator,
};
use rstest::fixture;

use crate::fixtures::{FleetDir, MARKER};

/// Artifacts compared between runs, relative to the fleet directory.
pub const ARTIFACTS: [&str; 6] = [
    "ssh_config",
    "hosts",
    "prometheus.yml",
    "dashboards/alice.json",
    "dashboards/bob.json",
    "dashboards/admin.json",
];

#[derive(Clone, Debug)]
pub struct RegenerateContext {
    pub dir: Arc<FleetDir>,
    pub runner: ScriptedRunner,
    pub check_keys: bool,
    pub outcome: Option<Result<RegenerationSummary, String>>,
    pub first_run: Option<Vec<String>>,
}

impl RegenerateContext {
    pub fn targets(&self) -> OutputTargets {
        OutputTargets {
            ssh_config: self.dir.path("ssh_config"),
            ansible_inventory: self.dir.path("hosts"),
            prometheus_config: self.dir.path("prometheus.yml"),
            grafana_dashboards: self.dir.path("dashboards"),
            marker: String::from(MARKER),
            healthcheck_port: 9977,
        }
    }

    pub fn run(&self) -> Result<RegenerationSummary, RegenerateError> {
        let inventory = Inventory::load(&self.dir.path("servers.yaml"))
            .unwrap_or_else(|err| panic!("inventory fixture should load: {err}"));
        let registry = PanelRegistry::discover(&self.dir.path("panels"))
            .unwrap_or_else(|err| panic!("panel fixture should load: {err}"));
        Regenerator::new(
            self.targets(),
            registry,
            KeyProvisioner::new("ssh-copy-id", self.runner.clone()),
        )
        .with_key_check(self.check_keys)
        .execute(&inventory)
    }

    pub fn snapshot(&self) -> Vec<String> {
        ARTIFACTS
            .iter()
            .map(|relative| self.dir.read(relative))
            .collect()
    }
}

#[fixture]
pub fn regenerate_context() -> RegenerateContext {
    RegenerateContext {
        dir: Arc::new(FleetDir::seeded(SAMPLE_INVENTORY)),
        runner: ScriptedRunner::new(),
        check_keys: true,
        outcome: None,
        first_run: None,
    }
}
