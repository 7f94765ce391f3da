//! Behavioural scenarios for `fleetgen generate`.

#[path = "common/fixtures.rs"]
mod fixtures;

mod regenerate;
