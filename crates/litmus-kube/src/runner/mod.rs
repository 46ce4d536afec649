//! Cluster command runners
//!
//! Every cluster interaction is a single kubectl-style command that returns
//! raw text. Two runners are provided:
//! - **Kubectl**: spawns the kubectl binary
//! - **Mock**: scripted in-memory responses for tests
//!
//! Namespace and context are fixed when a runner is built; the label selector
//! and any standard input are supplied per call.

mod kubectl;
mod mock;

pub use kubectl::{DEFAULT_KUBECTL_PATH, DEFAULT_NAMESPACE, Kubectl, KubectlConfig};
pub use mock::{MockKubeRunner, RecordedCall};

use async_trait::async_trait;

use crate::error::Result;

/// Executes cluster commands and returns their standard output
///
/// Implementations must be Send + Sync so verifiers can be shared across
/// async tasks.
#[async_trait]
pub trait KubeRunner: Send + Sync + Sized {
    /// Runner scoped to another namespace; a blank namespace keeps the
    /// configured default
    fn with_namespace(&self, namespace: &str) -> Self;

    /// Run a command, optionally filtered by a label selector
    async fn run(&self, args: &[&str], labels: Option<&str>) -> Result<String>;

    /// Run a command with `stdin` piped to its standard input, e.g.
    /// `apply -f -` with a rendered manifest
    async fn run_stdin(&self, args: &[&str], labels: Option<&str>, stdin: &[u8]) -> Result<String>;
}

/// Build the full argument list for a command
///
/// Flags are appended after the command arguments and only when their value
/// is not blank.
pub fn kubectl_args(
    args: &[&str],
    namespace: Option<&str>,
    context: Option<&str>,
    labels: Option<&str>,
) -> Vec<String> {
    let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();

    let flags = [
        ("namespace", namespace),
        ("context", context),
        ("selector", labels),
    ];
    for (flag, value) in flags {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            full.push(format!("--{}={}", flag, value));
        }
    }

    full
}
