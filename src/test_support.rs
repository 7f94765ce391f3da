//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::rc::Rc;

use camino::Utf8Path;

use crate::inventory::Inventory;
use crate::provision::{CommandError, CommandOutput, CommandRunner};

/// Inventory document used across the test suites.
///
/// `alpha` is a payee server hosting two instances from different projects,
/// `beta` opts out of key checks, and the instances carry variables of every
/// scalar type.
pub const SAMPLE_INVENTORY: &str = r#"servers:
  - alias: alpha
    ip: 10.0.0.1
    user: root
    key: /root/.ssh/alpha
    server-payee: me
  - alias: beta
    ip: 10.0.0.2
    user: ubuntu
    key: /root/.ssh/beta
    skip-ssh-check: true
  - alias: gamma
    ip: 10.0.0.3
    user: root
    key: /root/.ssh/gamma
instances:
  - name: aleo-1
    server: alpha
    project: aleo
    owner: alice
    variables:
      node_port: 4133
      label: "main net"
      debug: false
  - name: aleo-2
    server: beta
    project: aleo
    owner: bob
  - name: sui-1
    server: gamma
    project: sui
    owner: alice
    variables:
      ratio: 0.5
  - name: sui-2
    server: alpha
    project: sui
    owner: alice
"#;

/// Parses [`SAMPLE_INVENTORY`].
///
/// # Panics
///
/// Panics if the sample document no longer parses.
#[must_use]
pub fn sample_inventory() -> Inventory {
    Inventory::parse(Utf8Path::new("servers.yaml"), SAMPLE_INVENTORY)
        .unwrap_or_else(|err| panic!("sample inventory should parse: {err}"))
}

/// One server `A` (`u@10.0.0.1`, key `/k`) running instance `i1` of project
/// `p` for owner `o`.
///
/// # Panics
///
/// Panics if the document no longer parses.
#[must_use]
pub fn single_instance_inventory() -> Inventory {
    let document = concat!(
        "servers:\n",
        "  - {alias: A, ip: 10.0.0.1, user: u, key: /k}\n",
        "instances:\n",
        "  - {name: i1, server: A, project: p, owner: o}\n",
    );
    Inventory::parse(Utf8Path::new("servers.yaml"), document)
        .unwrap_or_else(|err| panic!("single instance inventory should parse: {err}"))
}

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// Used to drive deterministic command outcomes without spawning processes.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Rc<RefCell<VecDeque<CommandOutput>>>,
    invocations: Rc<RefCell<Vec<CommandInvocation>>>,
}

/// Records a single invocation made through [`ScriptedRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandInvocation {
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    /// Returns a shell-like command string for assertions.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(
            self.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.borrow().clone()
    }

    /// Pushes a successful exit status.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32) {
        self.push_output(Some(code), "", "simulated failure");
    }

    /// Pushes a response with no exit code to simulate abnormal termination.
    pub fn push_missing_exit_code(&self) {
        self.push_output(None, "", "");
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.borrow_mut().push_back(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        self.invocations.borrow_mut().push(CommandInvocation {
            program: program.to_owned(),
            args: args.to_vec(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| CommandError::Spawn {
                program: program.to_owned(),
                message: String::from("no scripted response available"),
            })
    }
}
