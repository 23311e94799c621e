//! process::mock
//!
//! Scripted [`CommandRunner`] for deterministic tests.
//!
//! # Design
//!
//! Every invocation is recorded. Outcomes come from rules matched in
//! insertion order against [`Invocation::command_line`]; the first rule whose
//! needle is a substring (and whose privilege filter matches) decides the
//! result. Invocations no rule matches succeed with empty output.
//!
//! # Example
//!
//! ```
//! use devkit::process::mock::{MockResponse, MockRunner};
//! use devkit::process::{run_escalated, Invocation, Privilege};
//!
//! let runner = MockRunner::new().on_normal("compose up", MockResponse::fail(1, "denied"));
//! let up = Invocation::new("docker").args(["compose", "up", "-d"]);
//!
//! let result = run_escalated(&runner, &up, |_| {}).unwrap();
//! assert_eq!(result.privilege, Privilege::Elevated);
//! assert_eq!(runner.calls().len(), 2);
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{CommandRunner, Invocation, Output, Privilege, ProcessError};

/// Scripted outcome of a matched invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Exit 0 with the given stdout.
    Success(String),
    /// Exit with `code` and the given stderr.
    Failure { code: i32, stderr: String },
    /// The program could not be started.
    SpawnError,
}

impl MockResponse {
    pub fn ok() -> Self {
        Self::Success(String::new())
    }

    pub fn stdout(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    pub fn fail(code: i32, stderr: impl Into<String>) -> Self {
        Self::Failure {
            code,
            stderr: stderr.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    privilege: Option<Privilege>,
    response: MockResponse,
    /// `None` means unlimited.
    remaining: Option<usize>,
    /// Program that becomes available once this rule answers successfully.
    provides: Option<String>,
}

/// Mock runner for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    inner: Arc<Mutex<MockRunnerInner>>,
}

#[derive(Debug, Default)]
struct MockRunnerInner {
    rules: Vec<Rule>,
    calls: Vec<Invocation>,
    available: HashSet<String>,
}

impl MockRunner {
    /// A runner where every invocation succeeds and no program is on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockRunnerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push_rule(self, rule: Rule) -> Self {
        self.lock().rules.push(rule);
        self
    }

    /// Mark programs as resolvable on `PATH`.
    pub fn with_programs(self, programs: &[&str]) -> Self {
        self.lock()
            .available
            .extend(programs.iter().map(|p| p.to_string()));
        self
    }

    /// Answer every matching invocation with `response`.
    pub fn on(self, needle: &str, response: MockResponse) -> Self {
        self.push_rule(Rule {
            needle: needle.to_string(),
            privilege: None,
            response,
            remaining: None,
            provides: None,
        })
    }

    /// Answer the next matching invocation only.
    pub fn once(self, needle: &str, response: MockResponse) -> Self {
        self.push_rule(Rule {
            needle: needle.to_string(),
            privilege: None,
            response,
            remaining: Some(1),
            provides: None,
        })
    }

    /// Answer matching invocations that run without `sudo`.
    pub fn on_normal(self, needle: &str, response: MockResponse) -> Self {
        self.push_rule(Rule {
            needle: needle.to_string(),
            privilege: Some(Privilege::Normal),
            response,
            remaining: None,
            provides: None,
        })
    }

    /// Answer matching invocations that run under `sudo`.
    pub fn on_elevated(self, needle: &str, response: MockResponse) -> Self {
        self.push_rule(Rule {
            needle: needle.to_string(),
            privilege: Some(Privilege::Elevated),
            response,
            remaining: None,
            provides: None,
        })
    }

    /// Succeed on matching invocations and make `program` available afterwards.
    pub fn installs(self, needle: &str, program: &str) -> Self {
        self.push_rule(Rule {
            needle: needle.to_string(),
            privilege: None,
            response: MockResponse::ok(),
            remaining: None,
            provides: Some(program.to_string()),
        })
    }

    /// Every invocation seen so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.lock().calls.clone()
    }

    /// Rendered command lines of every invocation, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    /// Number of invocations whose command line contains `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    /// Index of the first invocation containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.command_lines()
            .iter()
            .position(|line| line.contains(needle))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> Result<Output, ProcessError> {
        let mut inner = self.lock();
        inner.calls.push(invocation.clone());

        let line = invocation.command_line();
        let matched = inner.rules.iter_mut().find(|rule| {
            rule.remaining != Some(0)
                && line.contains(&rule.needle)
                && rule.privilege.map_or(true, |p| p == invocation.privilege())
        });

        let (response, provides) = match matched {
            Some(rule) => {
                if let Some(n) = rule.remaining.as_mut() {
                    *n -= 1;
                }
                (rule.response.clone(), rule.provides.clone())
            }
            None => (MockResponse::ok(), None),
        };

        match response {
            MockResponse::Success(stdout) => {
                if let Some(program) = provides {
                    inner.available.insert(program);
                }
                Ok(Output::ok(stdout))
            }
            MockResponse::Failure { code, stderr } => Ok(Output::failed(code, stderr)),
            MockResponse::SpawnError => Err(ProcessError::Spawn {
                command: line,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock: not found"),
            }),
        }
    }

    fn is_available(&self, program: &str) -> bool {
        self.lock().available.contains(program)
    }
}
