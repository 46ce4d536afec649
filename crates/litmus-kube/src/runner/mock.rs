//! Mock runner for testing
//!
//! Responds to commands from a script instead of a cluster, useful for unit
//! tests of verifiers without requiring a Kubernetes cluster.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use super::{KubeRunner, kubectl_args};
use crate::error::{Result, VerifyError};

const MOCK_NAMESPACE: &str = "litmus";

/// Scripted runner that records every call
///
/// Rules are matched in registration order against the rendered command line
/// (arguments followed by `--namespace=` and `--selector=` flags). Rules added
/// with [`MockKubeRunner::once`] or [`MockKubeRunner::fail_once`] are
/// consumed by their first match.
#[derive(Clone)]
pub struct MockKubeRunner {
    state: Arc<RwLock<MockState>>,
    namespace: String,
}

#[derive(Default)]
struct MockState {
    rules: Vec<Rule>,
    calls: Vec<RecordedCall>,
}

struct Rule {
    pattern: String,
    response: std::result::Result<String, String>,
    once: bool,
}

/// A command received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Namespace the runner was scoped to
    pub namespace: String,
    /// Arguments as passed by the caller
    pub args: Vec<String>,
    /// Label selector, if any
    pub labels: Option<String>,
    /// Rendered command line used for matching
    pub command: String,
    /// Standard input, for commands run with one
    pub stdin: Option<String>,
}

impl MockKubeRunner {
    /// Create a mock without any scripted responses
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::default())),
            namespace: MOCK_NAMESPACE.to_string(),
        }
    }

    /// Respond with `output` to every command containing `pattern`
    pub fn on(self, pattern: &str, output: &str) -> Self {
        self.push(pattern, Ok(output.to_string()), false)
    }

    /// Respond with `output` to the next command containing `pattern`
    pub fn once(self, pattern: &str, output: &str) -> Self {
        self.push(pattern, Ok(output.to_string()), true)
    }

    /// Fail every command containing `pattern` with `stderr`
    pub fn fail(self, pattern: &str, stderr: &str) -> Self {
        self.push(pattern, Err(stderr.to_string()), false)
    }

    /// Fail the next command containing `pattern` with `stderr`
    pub fn fail_once(self, pattern: &str, stderr: &str) -> Self {
        self.push(pattern, Err(stderr.to_string()), true)
    }

    fn push(self, pattern: &str, response: std::result::Result<String, String>, once: bool) -> Self {
        self.state.write().unwrap().rules.push(Rule {
            pattern: pattern.to_string(),
            response,
            once,
        });
        self
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Rendered command lines received so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    /// Number of calls whose command line contains `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.command.contains(pattern))
            .count()
    }

    /// Forget all recorded calls
    pub fn reset_calls(&self) {
        self.state.write().unwrap().calls.clear();
    }
}

impl Default for MockKubeRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KubeRunner for MockKubeRunner {
    fn with_namespace(&self, namespace: &str) -> Self {
        let namespace = namespace.trim();
        Self {
            state: Arc::clone(&self.state),
            namespace: if namespace.is_empty() {
                MOCK_NAMESPACE.to_string()
            } else {
                namespace.to_string()
            },
        }
    }

    async fn run(&self, args: &[&str], labels: Option<&str>) -> Result<String> {
        self.respond(args, labels, None)
    }

    async fn run_stdin(&self, args: &[&str], labels: Option<&str>, stdin: &[u8]) -> Result<String> {
        self.respond(args, labels, Some(String::from_utf8_lossy(stdin).into_owned()))
    }
}

impl MockKubeRunner {
    fn respond(&self, args: &[&str], labels: Option<&str>, stdin: Option<String>) -> Result<String> {
        let command = kubectl_args(args, Some(&self.namespace), None, labels).join(" ");

        let mut state = self.state.write().unwrap();
        state.calls.push(RecordedCall {
            namespace: self.namespace.clone(),
            args: args.iter().map(|a| a.to_string()).collect(),
            labels: labels.map(str::to_string),
            command: command.clone(),
            stdin,
        });

        let Some(index) = state
            .rules
            .iter()
            .position(|rule| command.contains(&rule.pattern))
        else {
            return Err(VerifyError::Command {
                stderr: format!("no mock response for '{}'", command),
                command,
            });
        };

        let response = if state.rules[index].once {
            state.rules.remove(index).response
        } else {
            state.rules[index].response.clone()
        };

        response.map_err(|stderr| VerifyError::Command { command, stderr })
    }
}
