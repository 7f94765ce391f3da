//! Rename transformations for the admin dashboard.

use serde_json::{Value, json};

use super::error::GrafanaError;
use crate::inventory::Inventory;

/// Builds one `renameByRegex` transformation per instance of `project`,
/// mapping the server address to the instance name.
///
/// # Errors
///
/// Returns [`GrafanaError::IpCollision`] when two instances of the project
/// run on servers with the same address.
pub fn rename_transformations(
    inventory: &Inventory,
    project: &str,
) -> Result<Vec<Value>, GrafanaError> {
    let mut renames: Vec<(&str, &str)> = Vec::new();
    for (instance, server) in inventory.placements_in_project(project) {
        if let Some((_, existing)) = renames.iter().find(|(ip, _)| *ip == server.ip) {
            return Err(GrafanaError::IpCollision {
                project: project.to_owned(),
                ip: server.ip.clone(),
                existing: (*existing).to_owned(),
                instance: instance.name.clone(),
            });
        }
        renames.push((server.ip.as_str(), instance.name.as_str()));
    }

    Ok(renames
        .into_iter()
        .map(|(ip, name)| {
            json!({
                "id": "renameByRegex",
                "options": {
                    "regex": format!(".*{ip}.*"),
                    "renamePattern": name,
                },
            })
        })
        .collect())
}
