//! OpenSSH client configuration generation.

use crate::inventory::Inventory;

/// Renders one `Host` block per instance, in document order.
///
/// Each block names the instance as the host alias and points at the server
/// the instance runs on. The result is meant to be appended after the
/// preserved preamble.
#[must_use]
pub fn render(inventory: &Inventory) -> String {
    let mut rendered = String::new();
    for (instance, server) in inventory.placements() {
        rendered.push_str(&format!(
            "\nHost {}\n    User {}\n    HostName {}\n    IdentityFile {}\n\n",
            instance.name, server.user, server.ip, server.key
        ));
    }
    rendered
}

/// Number of `Host` blocks [`render`] emits.
#[must_use]
pub fn host_count(inventory: &Inventory) -> usize {
    inventory.placements().count()
}
