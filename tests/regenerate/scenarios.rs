//! BDD scenarios for the regeneration workflow.

use rstest_bdd_macros::scenario;

use super::test_helpers::{RegenerateContext, regenerate_context};

#[scenario(
    path = "tests/features/regenerate.feature",
    name = "Regenerate every artifact from the inventory"
)]
fn scenario_regenerate_everything(regenerate_context: RegenerateContext) {
    let _ = regenerate_context;
}

#[scenario(
    path = "tests/features/regenerate.feature",
    name = "Regenerating twice leaves artifacts unchanged"
)]
fn scenario_regenerate_idempotent(regenerate_context: RegenerateContext) {
    let _ = regenerate_context;
}

#[scenario(
    path = "tests/features/regenerate.feature",
    name = "Abort when a key check fails"
)]
fn scenario_abort_on_key_failure(regenerate_context: RegenerateContext) {
    let _ = regenerate_context;
}
