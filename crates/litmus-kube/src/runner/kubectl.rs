//! kubectl-backed runner

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use super::{KubeRunner, kubectl_args};
use crate::error::{Result, VerifyError};

/// Location where the kubectl executable is expected by default
pub const DEFAULT_KUBECTL_PATH: &str = "/usr/local/bin/kubectl";

/// Namespace used when a component does not declare one
pub const DEFAULT_NAMESPACE: &str = "litmus";

/// Environment variable overriding the kubectl location
pub const KUBECTL_PATH_ENV: &str = "KUBECTL_PATH";

/// Environment variable overriding the default namespace
pub const NAMESPACE_ENV: &str = "LITMUS_NAMESPACE";

/// Settings shared by every kubectl invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubectlConfig {
    /// kubectl executable
    pub path: PathBuf,

    /// Namespace used when none is given
    pub namespace: String,

    /// kubeconfig context; the current context when unset
    pub context: Option<String>,
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_KUBECTL_PATH),
            namespace: DEFAULT_NAMESPACE.to_string(),
            context: None,
        }
    }
}

impl KubectlConfig {
    /// Read overrides from `KUBECTL_PATH` and `LITMUS_NAMESPACE`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(KUBECTL_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            config.path = PathBuf::from(path);
        }
        if let Some(namespace) = lookup(NAMESPACE_ENV).filter(|n| !n.trim().is_empty()) {
            config.namespace = namespace;
        }
        config
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Runs commands through the kubectl binary
#[derive(Debug, Clone)]
pub struct Kubectl {
    config: Arc<KubectlConfig>,
    namespace: String,
}

impl Kubectl {
    pub fn new(config: KubectlConfig) -> Self {
        let namespace = config.namespace.clone();
        Self {
            config: Arc::new(config),
            namespace,
        }
    }

    /// Namespace this runner targets
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn config(&self) -> &KubectlConfig {
        &self.config
    }
}

#[async_trait]
impl KubeRunner for Kubectl {
    fn with_namespace(&self, namespace: &str) -> Self {
        let namespace = namespace.trim();
        Self {
            config: Arc::clone(&self.config),
            namespace: if namespace.is_empty() {
                self.config.namespace.clone()
            } else {
                namespace.to_string()
            },
        }
    }

    async fn run(&self, args: &[&str], labels: Option<&str>) -> Result<String> {
        let full = self.args(args, labels);
        let program = self.program();
        tracing::debug!(command = %program, args = ?full, "running kubectl");

        let output = tokio::process::Command::new(&self.config.path)
            .args(&full)
            .output()
            .await
            .map_err(|source| VerifyError::CommandSpawn {
                program: program.clone(),
                source,
            })?;

        finish(&program, &full, output)
    }

    async fn run_stdin(&self, args: &[&str], labels: Option<&str>, stdin: &[u8]) -> Result<String> {
        let full = self.args(args, labels);
        let program = self.program();
        tracing::debug!(command = %program, args = ?full, bytes = stdin.len(), "running kubectl with stdin");

        let spawn_error = |source: std::io::Error| VerifyError::CommandSpawn {
            program: program.clone(),
            source,
        };

        let mut child = tokio::process::Command::new(&self.config.path)
            .args(&full)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut input) = child.stdin.take() {
            // A command that exits early closes its end; its stderr says why
            if let Err(e) = input.write_all(stdin).await
                && e.kind() != std::io::ErrorKind::BrokenPipe
            {
                return Err(spawn_error(e));
            }
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        finish(&program, &full, output)
    }
}

impl Kubectl {
    fn args(&self, args: &[&str], labels: Option<&str>) -> Vec<String> {
        kubectl_args(
            args,
            Some(&self.namespace),
            self.config.context.as_deref(),
            labels,
        )
    }

    fn program(&self) -> String {
        self.config.path.display().to_string()
    }
}

fn finish(program: &str, full: &[String], output: std::process::Output) -> Result<String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(status = ?output.status.code(), %stderr, "kubectl failed");
        return Err(VerifyError::Command {
            command: format!("{} {}", program, full.join(" ")),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
