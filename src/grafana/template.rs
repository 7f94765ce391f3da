//! Panel source backed by a JSON file of panel templates.
//!
//! A template file holds a JSON array of Grafana panel objects laid out as if
//! the section started at the top of the dashboard. When a section is
//! generated each panel receives a fresh `id`, its `gridPos.y` is shifted down
//! to the current row, and every `$servers` placeholder in a string value is
//! replaced with a regex alternation of the selected server addresses.

use camino::Utf8Path;
use serde_json::Value;

use super::Panel;
use super::error::GrafanaError;
use super::panels::{PanelSource, PanelSourceError};

/// Placeholder substituted with the server selection regex.
pub const SERVERS_PLACEHOLDER: &str = "$servers";

/// Regex used when a section covers every server.
const ALL_SERVERS: &str = ".*";

/// Panel templates for one project.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplatePanelSource {
    templates: Vec<Panel>,
}

impl TemplatePanelSource {
    /// Wraps already parsed panel templates.
    #[must_use]
    pub const fn new(templates: Vec<Panel>) -> Self {
        Self { templates }
    }

    /// Parses a JSON array of panel objects. `path` is used for error
    /// reporting.
    ///
    /// # Errors
    ///
    /// Returns [`GrafanaError::Template`] when `contents` is not an array of
    /// JSON objects.
    pub fn from_json(path: &Utf8Path, contents: &str) -> Result<Self, GrafanaError> {
        let templates: Vec<Panel> =
            serde_json::from_str(contents).map_err(|err| GrafanaError::Template {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        Ok(Self::new(templates))
    }

    /// Number of panels in every generated section.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` when the source produces no panels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl PanelSource for TemplatePanelSource {
    fn generate_section(
        &self,
        first_panel: usize,
        row: u64,
        servers: Option<&[String]>,
    ) -> Result<Vec<Panel>, PanelSourceError> {
        let selector = servers.map_or_else(|| String::from(ALL_SERVERS), |ips| ips.join("|"));

        let panels = self
            .templates
            .iter()
            .enumerate()
            .map(|(offset, template)| {
                let mut panel = template.clone();
                panel.insert(String::from("id"), Value::from(first_panel + offset + 1));
                shift_row(&mut panel, row);
                for value in panel.values_mut() {
                    substitute(value, &selector);
                }
                panel
            })
            .collect();
        Ok(panels)
    }
}

fn shift_row(panel: &mut Panel, row: u64) {
    let Some(Value::Object(grid)) = panel.get_mut("gridPos") else {
        return;
    };
    if let Some(y) = grid.get("y").and_then(Value::as_u64) {
        grid.insert(String::from("y"), Value::from(y.saturating_add(row)));
    }
}

fn substitute(value: &mut Value, selector: &str) {
    match value {
        Value::String(text) if text.contains(SERVERS_PLACEHOLDER) => {
            *text = text.replace(SERVERS_PLACEHOLDER, selector);
        }
        Value::Array(items) => {
            for item in items {
                substitute(item, selector);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute(item, selector);
            }
        }
        _ => {}
    }
}
