//! Core library for the fleetgen configuration generator.
//!
//! A single YAML inventory of servers and the service instances they run is
//! projected into an OpenSSH client config, an Ansible inventory, a
//! Prometheus scrape config and a set of Grafana dashboards. Hand-written
//! content above an autogenerated marker survives regeneration. After the
//! artifacts are written, `ssh-copy-id` makes sure key-based access works on
//! every server.

pub mod ansible;
pub mod artifacts;
pub mod config;
pub mod grafana;
pub mod inventory;
pub mod preamble;
pub mod prometheus;
pub mod provision;
pub mod regenerate;
pub mod ssh_config;
pub mod test_support;

pub use artifacts::ArtifactError;
pub use config::{ConfigError, FleetgenConfig};
pub use grafana::{
    Dashboard, DashboardBuilder, GrafanaError, Panel, PanelRegistry, PanelSource,
    PanelSourceError, TemplatePanelSource,
};
pub use inventory::{Instance, Inventory, InventoryError, Server, VariableValue};
pub use provision::{
    CommandError, CommandOutput, CommandRunner, KeyProvisioner, ProcessCommandRunner,
    ProvisionError, ProvisionSummary,
};
pub use regenerate::{OutputTargets, RegenerateError, RegenerationSummary, Regenerator};
