//! Ansible INI inventory generation.
//!
//! Two groupings are emitted from the same instance list: one group per
//! project, whose lines carry host variables, followed by one group per owner
//! listing bare host names. Group order is sorted; host order inside a group
//! follows the inventory document.
//!
//! Each project group header is repeated once after its host lines.

use crate::inventory::Inventory;

/// Renders the project and owner groups.
#[must_use]
pub fn render(inventory: &Inventory) -> String {
    let mut rendered = String::new();

    for project in inventory.projects() {
        rendered.push_str(&format!("\n\n[{project}]"));
        for (instance, server) in inventory.placements_in_project(project) {
            rendered.push_str(&format!(
                "\n{} is_my_server={}",
                instance.name,
                server.is_payee()
            ));
            for (name, value) in &instance.variables {
                rendered.push_str(&format!(" {name}={}", value.to_inventory_value()));
            }
        }
        rendered.push_str(&format!("\n[{project}]"));
    }

    for owner in inventory.owners() {
        rendered.push_str(&format!("\n\n[{owner}]"));
        for (instance, _) in inventory.placements_of_owner(owner) {
            rendered.push('\n');
            rendered.push_str(&instance.name);
        }
    }

    rendered
}

/// Number of distinct groups [`render`] emits (projects plus owners).
#[must_use]
pub fn group_count(inventory: &Inventory) -> usize {
    inventory.projects().len() + inventory.owners().len()
}
