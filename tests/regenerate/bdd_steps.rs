//! BDD step definitions for the regeneration workflow.

use rstest_bdd_macros::{given, then, when};

use super::test_helpers::RegenerateContext;
use crate::fixtures::SSH_PREAMBLE;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("every key check succeeds")]
fn key_checks_succeed(regenerate_context: &RegenerateContext) {
    regenerate_context.runner.push_success();
    regenerate_context.runner.push_success();
}

#[given("key checks are disabled")]
fn key_checks_disabled(regenerate_context: &RegenerateContext) -> RegenerateContext {
    RegenerateContext {
        check_keys: false,
        ..regenerate_context.clone()
    }
}

#[given("the key check fails with exit code \"{code}\"")]
fn key_check_fails(regenerate_context: &RegenerateContext, code: i32) {
    regenerate_context.runner.push_failure(code);
    regenerate_context.runner.push_success();
}

#[when("I regenerate the fleet configuration")]
fn regenerate(regenerate_context: &RegenerateContext) -> RegenerateContext {
    let outcome = regenerate_context.run().map_err(|err| err.to_string());
    RegenerateContext {
        outcome: Some(outcome),
        ..regenerate_context.clone()
    }
}

#[when("I regenerate the fleet configuration twice")]
fn regenerate_twice(regenerate_context: &RegenerateContext) -> RegenerateContext {
    let first = regenerate_context.run().map_err(|err| err.to_string());
    let first_run = first.is_ok().then(|| regenerate_context.snapshot());
    let outcome = first.and_then(|_| regenerate_context.run().map_err(|err| err.to_string()));
    RegenerateContext {
        outcome: Some(outcome),
        first_run,
        ..regenerate_context.clone()
    }
}

#[then("the regeneration succeeds")]
fn regeneration_succeeds(regenerate_context: &RegenerateContext) -> Result<(), StepError> {
    match regenerate_context.outcome {
        Some(Ok(_)) => Ok(()),
        Some(Err(ref message)) => Err(StepError::Assertion(format!(
            "expected success, got failure: {message}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("the regeneration fails mentioning \"{needle}\"")]
fn regeneration_fails(
    regenerate_context: &RegenerateContext,
    needle: String,
) -> Result<(), StepError> {
    let Some(Err(message)) = &regenerate_context.outcome else {
        return Err(StepError::Assertion(String::from(
            "expected failure outcome",
        )));
    };
    if message.contains(&needle) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected failure mentioning {needle}, got: {message}"
        )))
    }
}

#[then("the SSH config keeps its hand-written preamble")]
fn preamble_kept(regenerate_context: &RegenerateContext) -> Result<(), StepError> {
    let contents = regenerate_context.dir.read("ssh_config");
    if contents.starts_with(SSH_PREAMBLE)
        && contents.contains("\nHost aleo-1\n")
        && !contents.contains("stale")
    {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "unexpected SSH config: {contents}"
        )))
    }
}

#[then("a dashboard file \"{name}\" is written")]
fn dashboard_written(regenerate_context: &RegenerateContext, name: String) -> Result<(), StepError> {
    let path = regenerate_context.dir.path("dashboards").join(&name);
    if path.is_file() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!("missing dashboard {path}")))
    }
}

#[then("the second run left every artifact unchanged")]
fn artifacts_unchanged(regenerate_context: &RegenerateContext) -> Result<(), StepError> {
    let first = regenerate_context
        .first_run
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("missing first run snapshot")))?;
    if *first == regenerate_context.snapshot() {
        Ok(())
    } else {
        Err(StepError::Assertion(String::from(
            "artifacts changed between runs",
        )))
    }
}

#[then("ssh-copy-id ran \"{count}\" times")]
fn ssh_copy_id_count(regenerate_context: &RegenerateContext, count: usize) -> Result<(), StepError> {
    let calls = regenerate_context.runner.invocations();
    if calls.len() == count
        && calls
            .iter()
            .all(|call| call.program == "ssh-copy-id")
    {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} ssh-copy-id invocations, got {calls:?}"
        )))
    }
}
