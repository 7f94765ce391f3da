//! The server and instance inventory shared by every generator.
//!
//! The inventory is read once from a YAML document with two collections,
//! `servers` and `instances`. After parsing, an alias index is built so that
//! instance placements resolve in constant time, and every instance reference
//! is checked against it. The resulting [`Inventory`] is immutable.

use std::collections::{BTreeMap, BTreeSet};

use camino::Utf8Path;
use tracing::debug;

use crate::artifacts;

mod error;
mod model;

pub use error::InventoryError;
pub use model::{Instance, Server, VariableValue};

use model::InventoryDocument;

/// Validated servers and instances with an alias index.
#[derive(Clone, Debug, PartialEq)]
pub struct Inventory {
    servers: Vec<Server>,
    index: BTreeMap<String, usize>,
    instances: Vec<Instance>,
}

impl Inventory {
    /// Builds an inventory from already parsed records.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::DuplicateAlias`] when two servers share an
    /// alias, or [`InventoryError::UnknownServer`] when an instance references
    /// an alias that is not defined.
    pub fn from_parts(
        servers: Vec<Server>,
        instances: Vec<Instance>,
    ) -> Result<Self, InventoryError> {
        let mut index = BTreeMap::new();
        for (position, server) in servers.iter().enumerate() {
            if index.insert(server.alias.clone(), position).is_some() {
                return Err(InventoryError::DuplicateAlias {
                    alias: server.alias.clone(),
                });
            }
        }

        if let Some(dangling) = instances
            .iter()
            .find(|instance| !index.contains_key(&instance.server))
        {
            return Err(InventoryError::UnknownServer {
                instance: dangling.name.clone(),
                alias: dangling.server.clone(),
            });
        }

        Ok(Self {
            servers,
            index,
            instances,
        })
    }

    /// Parses a YAML inventory document. `source` is only used for error
    /// reporting.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Parse`] for malformed documents and the
    /// validation errors of [`Inventory::from_parts`].
    pub fn parse(source: &Utf8Path, contents: &str) -> Result<Self, InventoryError> {
        let document: InventoryDocument =
            serde_yaml::from_str(contents).map_err(|err| InventoryError::Parse {
                path: source.to_path_buf(),
                message: err.to_string(),
            })?;
        Self::from_parts(document.servers, document.instances)
    }

    /// Reads and parses the inventory document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Read`] when the file cannot be read, plus any
    /// error from [`Inventory::parse`].
    pub fn load(path: &Utf8Path) -> Result<Self, InventoryError> {
        let contents = artifacts::read_to_string(path)?;
        let inventory = Self::parse(path, &contents)?;
        debug!(
            path = %path,
            servers = inventory.servers.len(),
            instances = inventory.instances.len(),
            "loaded inventory"
        );
        Ok(inventory)
    }

    /// Servers in document order.
    #[must_use]
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Instances in document order.
    #[must_use]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Looks up a server by alias.
    #[must_use]
    pub fn server(&self, alias: &str) -> Option<&Server> {
        self.index
            .get(alias)
            .and_then(|position| self.servers.get(*position))
    }

    /// Yields every instance with the server it runs on, in document order.
    pub fn placements(&self) -> impl Iterator<Item = (&Instance, &Server)> {
        self.instances
            .iter()
            .filter_map(|instance| self.server(&instance.server).map(|server| (instance, server)))
    }

    /// Placements of instances belonging to `project`.
    pub fn placements_in_project<'a>(
        &'a self,
        project: &'a str,
    ) -> impl Iterator<Item = (&'a Instance, &'a Server)> {
        self.placements()
            .filter(move |(instance, _)| instance.project == project)
    }

    /// Placements of instances operated for `owner`.
    pub fn placements_of_owner<'a>(
        &'a self,
        owner: &'a str,
    ) -> impl Iterator<Item = (&'a Instance, &'a Server)> {
        self.placements()
            .filter(move |(instance, _)| instance.owner == owner)
    }

    /// Distinct project names, sorted.
    #[must_use]
    pub fn projects(&self) -> BTreeSet<&str> {
        self.instances
            .iter()
            .map(|instance| instance.project.as_str())
            .collect()
    }

    /// Distinct owner names, sorted.
    #[must_use]
    pub fn owners(&self) -> BTreeSet<&str> {
        self.instances
            .iter()
            .map(|instance| instance.owner.as_str())
            .collect()
    }

    /// Distinct projects an owner has instances in, sorted.
    #[must_use]
    pub fn projects_of_owner(&self, owner: &str) -> BTreeSet<&str> {
        self.instances
            .iter()
            .filter(|instance| instance.owner == owner)
            .map(|instance| instance.project.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests;
