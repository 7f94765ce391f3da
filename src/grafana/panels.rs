//! Per-project panel sources and the registry that resolves them.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;
use tracing::debug;

use super::Panel;
use super::error::GrafanaError;
use super::template::TemplatePanelSource;

/// Extension of panel template files inside the panels directory.
const TEMPLATE_EXTENSION: &str = "json";

/// Error reported by a panel source.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PanelSourceError {
    message: String,
}

impl PanelSourceError {
    /// Creates an error carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces the dashboard panels for one project.
pub trait PanelSource {
    /// Generates a section of panels.
    ///
    /// `first_panel` is the number of panels already on the dashboard and
    /// `row` the first free vertical grid offset. `servers` restricts the
    /// panels to the given server addresses; `None` means every server of the
    /// project. Every returned panel must carry a `gridPos` with integer `y`
    /// and `h` entries.
    ///
    /// # Errors
    ///
    /// Returns [`PanelSourceError`] when the section cannot be produced.
    fn generate_section(
        &self,
        first_panel: usize,
        row: u64,
        servers: Option<&[String]>,
    ) -> Result<Vec<Panel>, PanelSourceError>;
}

impl<F> PanelSource for F
where
    F: Fn(usize, u64, Option<&[String]>) -> Result<Vec<Panel>, PanelSourceError>,
{
    fn generate_section(
        &self,
        first_panel: usize,
        row: u64,
        servers: Option<&[String]>,
    ) -> Result<Vec<Panel>, PanelSourceError> {
        self(first_panel, row, servers)
    }
}

/// Maps project names to the panel source that renders them.
///
/// Projects without a registered source contribute no panels.
#[derive(Default)]
pub struct PanelRegistry {
    sources: BTreeMap<String, Box<dyn PanelSource>>,
}

impl PanelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source` for `project`, replacing any previous source.
    pub fn register(&mut self, project: impl Into<String>, source: impl PanelSource + 'static) {
        self.sources.insert(project.into(), Box::new(source));
    }

    /// Builder-style variant of [`PanelRegistry::register`].
    #[must_use]
    pub fn with_source(
        mut self,
        project: impl Into<String>,
        source: impl PanelSource + 'static,
    ) -> Self {
        self.register(project, source);
        self
    }

    /// Returns the source registered for `project`.
    #[must_use]
    pub fn get(&self, project: &str) -> Option<&dyn PanelSource> {
        self.sources.get(project).map(AsRef::as_ref)
    }

    /// Registered project names, sorted.
    pub fn projects(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Registers a [`TemplatePanelSource`] for every `<project>.json` file in
    /// `dir`.
    ///
    /// A missing directory yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`GrafanaError::Template`] when the directory cannot be listed
    /// or a template file cannot be read or parsed.
    pub fn discover(dir: &Utf8Path) -> Result<Self, GrafanaError> {
        let mut registry = Self::new();
        let panels_dir = match Dir::open_ambient_dir(dir, ambient_authority()) {
            Ok(opened) => opened,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %dir, "panel template directory missing; no panels registered");
                return Ok(registry);
            }
            Err(err) => return Err(template_error(dir, &err)),
        };

        let entries = panels_dir
            .entries()
            .map_err(|err| template_error(dir, &err))?;
        for entry in entries {
            let file_name = entry
                .and_then(|found| found.file_name())
                .map_err(|err| template_error(dir, &err))?;
            let path = dir.join(&file_name);
            let (Some(project), Some(TEMPLATE_EXTENSION)) = (path.file_stem(), path.extension())
            else {
                continue;
            };
            let contents = panels_dir
                .read_to_string(&file_name)
                .map_err(|err| template_error(&path, &err))?;
            let source = TemplatePanelSource::from_json(&path, &contents)?;
            debug!(project, templates = source.len(), "registered panel templates");
            registry.register(project, source);
        }

        Ok(registry)
    }
}

impl fmt::Debug for PanelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelRegistry")
            .field("projects", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn template_error(path: &Utf8Path, err: &io::Error) -> GrafanaError {
    GrafanaError::Template {
        path: Utf8PathBuf::from(path),
        message: err.to_string(),
    }
}
