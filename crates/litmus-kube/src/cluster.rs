//! Cluster-scoped checks and housekeeping
//!
//! Unlike [`InstallVerifier`](crate::InstallVerifier), nothing here needs an
//! installation descriptor.

use async_trait::async_trait;
use std::path::Path;

use crate::conditions::{Condition, distinct_node_count};
use crate::error::{Result, VerifyError};
use crate::queries;
use crate::runner::KubeRunner;
use crate::verify::{ConditionVerifier, ConnectVerifier};

/// Verifies the cluster itself
#[derive(Debug, Clone)]
pub struct ClusterVerifier<R: KubeRunner> {
    runner: R,
}

impl<R: KubeRunner> ClusterVerifier<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Uncordon every node of the cluster
    ///
    /// With `ignore_errors`, nodes that fail to uncordon are logged and
    /// skipped; otherwise the first failure is returned.
    pub async fn uncordon_all_nodes(&self, ignore_errors: bool) -> Result<Vec<String>> {
        let mut uncordoned = Vec::new();

        for node in queries::node_names(&self.runner).await? {
            match queries::uncordon_node(&self.runner, &node).await {
                Ok(()) => uncordoned.push(node),
                Err(e) if ignore_errors => {
                    tracing::warn!(%node, error = %e, "failed to uncordon node");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(uncordoned)
    }

    /// Create or update the resources in a manifest file
    pub async fn apply_manifest(&self, path: impl AsRef<Path>) -> Result<()> {
        self.manifest("apply", path.as_ref()).await
    }

    /// Delete the resources in a manifest file
    pub async fn delete_manifest(&self, path: impl AsRef<Path>) -> Result<()> {
        self.manifest("delete", path.as_ref()).await
    }

    /// Apply a manifest passed as text, e.g. one rendered in memory
    pub async fn apply_stdin(&self, manifest: &[u8]) -> Result<String> {
        tracing::info!(bytes = manifest.len(), "applying manifest from stdin");
        self.runner.run_stdin(&["apply", "-f", "-"], None, manifest).await
    }

    async fn manifest(&self, verb: &str, path: &Path) -> Result<()> {
        let file = path.display().to_string();
        tracing::info!(verb, manifest = %file, "running manifest");
        self.runner.run(&[verb, "-f", file.as_str()], None).await?;
        Ok(())
    }
}

#[async_trait]
impl<R: KubeRunner> ConnectVerifier for ClusterVerifier<R> {
    async fn is_connected(&self) -> Result<bool> {
        self.runner.run(&["get", "pods"], None).await?;
        Ok(true)
    }
}

#[async_trait]
impl<R: KubeRunner> ConditionVerifier for ClusterVerifier<R> {
    async fn is_condition(&self, _alias: &str, condition: Condition) -> Result<bool> {
        match condition {
            Condition::MultiNodeCluster => Ok(distinct_node_count(&self.runner).await? > 1),
            other => Err(VerifyError::UnsupportedCondition(other.to_string())),
        }
    }
}
