//! Grafana dashboard generation.
//!
//! Every owner gets a dashboard made of the panel sections of the projects
//! they run instances in, restricted to their own servers. A separate admin
//! dashboard stacks every project's sections unfiltered and attaches rename
//! transformations so series are labelled by instance name rather than by
//! server address.
//!
//! Sections are stacked vertically: each source receives the first free row
//! and the row after a section is the largest `gridPos.y + gridPos.h` among
//! the panels it returned.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::inventory::Inventory;

mod error;
mod panels;
mod template;
mod transform;

pub use error::GrafanaError;
pub use panels::{PanelRegistry, PanelSource, PanelSourceError};
pub use template::{SERVERS_PLACEHOLDER, TemplatePanelSource};
pub use transform::rename_transformations;

/// A Grafana panel object.
pub type Panel = Map<String, Value>;

/// Name used for the admin dashboard title and uid.
pub const ADMIN_DASHBOARD_NAME: &str = "Admin";

/// File stem of the admin dashboard.
pub const ADMIN_DASHBOARD_FILE_STEM: &str = "admin";

/// A dashboard ready to be serialised.
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    name: String,
    file_stem: String,
    panels: Vec<Panel>,
}

impl Dashboard {
    /// Creates a dashboard titled after `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, file_stem: impl Into<String>, panels: Vec<Panel>) -> Self {
        Self {
            name: name.into(),
            file_stem: file_stem.into(),
            panels,
        }
    }

    /// Owner name, or [`ADMIN_DASHBOARD_NAME`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Panels in layout order.
    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// File name the dashboard is written to.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.file_stem)
    }

    /// Builds the dashboard JSON document.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "annotations": {"list": []},
            "editable": false,
            "gnetId": null,
            "graphTooltip": 0,
            "links": [],
            "panels": self.panels,
            "schemaVersion": 30,
            "style": "dark",
            "tags": [],
            "templating": {"list": []},
            "time": {"from": "now-6h", "to": "now"},
            "timepicker": {},
            "timezone": "",
            "title": format!("{} Dashboard", self.name),
            "uid": self.name,
            "version": 1,
        })
    }
}

/// Assembles dashboards from an inventory and a panel registry.
#[derive(Debug)]
pub struct DashboardBuilder<'a> {
    inventory: &'a Inventory,
    registry: &'a PanelRegistry,
}

impl<'a> DashboardBuilder<'a> {
    /// Creates a builder over `inventory` using the sources in `registry`.
    #[must_use]
    pub const fn new(inventory: &'a Inventory, registry: &'a PanelRegistry) -> Self {
        Self {
            inventory,
            registry,
        }
    }

    /// Builds one dashboard per owner, sorted by owner name.
    ///
    /// # Errors
    ///
    /// Returns [`GrafanaError`] when a source fails or returns a panel without
    /// a usable `gridPos`.
    pub fn owner_dashboards(&self) -> Result<Vec<Dashboard>, GrafanaError> {
        self.inventory
            .owners()
            .into_iter()
            .map(|owner| self.owner_dashboard(owner))
            .collect()
    }

    /// Builds the dashboard of a single owner.
    ///
    /// # Errors
    ///
    /// Returns [`GrafanaError`] when a source fails or returns a panel without
    /// a usable `gridPos`.
    pub fn owner_dashboard(&self, owner: &str) -> Result<Dashboard, GrafanaError> {
        let mut layout = Layout::default();
        for project in self.inventory.projects_of_owner(owner) {
            let Some(source) = self.registry.get(project) else {
                debug!(owner, project, "no panel source registered");
                continue;
            };
            let servers: Vec<String> = self
                .inventory
                .placements_of_owner(owner)
                .filter(|(instance, _)| instance.project == project)
                .map(|(_, server)| server.ip.clone())
                .collect();
            let section = source
                .generate_section(layout.panels.len(), layout.row, Some(servers.as_slice()))
                .map_err(|err| source_error(project, err))?;
            layout.append(project, section)?;
        }
        Ok(Dashboard::new(owner, owner, layout.panels))
    }

    /// Builds the admin dashboard covering every project.
    ///
    /// # Errors
    ///
    /// Returns [`GrafanaError::IpCollision`] when a project's instances share
    /// a server address, plus the errors of
    /// [`DashboardBuilder::owner_dashboards`].
    pub fn admin_dashboard(&self) -> Result<Dashboard, GrafanaError> {
        let mut layout = Layout::default();
        for project in self.inventory.projects() {
            let Some(source) = self.registry.get(project) else {
                debug!(project, "no panel source registered");
                continue;
            };
            let transformations = Value::Array(rename_transformations(self.inventory, project)?);
            let mut section = source
                .generate_section(layout.panels.len(), layout.row, None)
                .map_err(|err| source_error(project, err))?;
            for panel in &mut section {
                panel.insert(String::from("transformations"), transformations.clone());
            }
            layout.append(project, section)?;
        }
        Ok(Dashboard::new(
            ADMIN_DASHBOARD_NAME,
            ADMIN_DASHBOARD_FILE_STEM,
            layout.panels,
        ))
    }
}

#[derive(Debug, Default)]
struct Layout {
    panels: Vec<Panel>,
    row: u64,
}

impl Layout {
    fn append(&mut self, project: &str, section: Vec<Panel>) -> Result<(), GrafanaError> {
        if section.is_empty() {
            return Ok(());
        }
        let mut bottom = 0;
        for (index, panel) in section.iter().enumerate() {
            let edge = panel_bottom(panel).ok_or_else(|| GrafanaError::InvalidGridPos {
                project: project.to_owned(),
                index,
            })?;
            bottom = bottom.max(edge);
        }
        self.row = bottom;
        self.panels.extend(section);
        Ok(())
    }
}

fn panel_bottom(panel: &Panel) -> Option<u64> {
    let grid = panel.get("gridPos")?;
    let y = grid.get("y").and_then(Value::as_u64)?;
    let height = grid.get("h").and_then(Value::as_u64)?;
    y.checked_add(height)
}

fn source_error(project: &str, source: PanelSourceError) -> GrafanaError {
    GrafanaError::Source {
        project: project.to_owned(),
        source,
    }
}
