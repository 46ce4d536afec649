//! Disruptive actions against aliased components
//!
//! Actions mutate the live cluster and are not idempotent: deleting a pod
//! that is already gone is reported as a failure by kubectl.

use async_trait::async_trait;
use litmus_core::Component;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VerifyError};
use crate::queries;
use crate::runner::KubeRunner;
use crate::verify::{ActionVerifier, InstallVerifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Delete the first running pod in list order
    #[serde(rename = "delete-any-pod")]
    DeleteAnyPod,

    #[serde(rename = "delete-oldest-pod")]
    DeleteOldestPod,

    /// Cordon the node hosting the oldest running pod
    #[serde(rename = "cordon-node-with-oldest-pod")]
    CordonNodeWithOldestPod,
}

impl Action {
    pub const ALL: [Action; 3] = [
        Action::DeleteAnyPod,
        Action::DeleteOldestPod,
        Action::CordonNodeWithOldestPod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::DeleteAnyPod => "delete-any-pod",
            Action::DeleteOldestPod => "delete-oldest-pod",
            Action::CordonNodeWithOldestPod => "cordon-node-with-oldest-pod",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| VerifyError::UnsupportedAction(s.to_string()))
    }
}

impl<R: KubeRunner> InstallVerifier<R> {
    /// Pod-like component behind `alias` together with its selector
    fn pod_target(&self, alias: &str) -> Result<(&Component, &str)> {
        let component = self.installation.pod_component(alias)?;
        let labels = component
            .selector()
            .ok_or_else(|| VerifyError::MissingSelector {
                operation: "pod actions",
                kind: component.kind().to_string(),
                alias: alias.to_string(),
            })?;
        Ok((component, labels))
    }

    async fn oldest_running_pod(&self, alias: &str, runner: &R, labels: &str) -> Result<String> {
        queries::oldest_running_pod(runner, labels)
            .await?
            .ok_or_else(|| VerifyError::NoRunningPod {
                alias: alias.to_string(),
            })
    }

    async fn delete_any_pod(&self, alias: &str) -> Result<bool> {
        let (component, labels) = self.pod_target(alias)?;
        let runner = self.runner_for(component);

        let pods = queries::running_pods(&runner, labels).await?;
        let pod = pods.first().ok_or_else(|| VerifyError::NoRunningPod {
            alias: alias.to_string(),
        })?;

        queries::delete_pod(&runner, pod).await?;
        Ok(true)
    }

    async fn delete_oldest_pod(&self, alias: &str) -> Result<bool> {
        let (component, labels) = self.pod_target(alias)?;
        let runner = self.runner_for(component);

        let pod = self.oldest_running_pod(alias, &runner, labels).await?;
        queries::delete_pod(&runner, &pod).await?;
        Ok(true)
    }

    async fn cordon_node_with_oldest_pod(&self, alias: &str) -> Result<bool> {
        let (component, labels) = self.pod_target(alias)?;
        let runner = self.runner_for(component);

        let pod = self.oldest_running_pod(alias, &runner, labels).await?;
        let node = queries::cordon_node_with_pod(&runner, &pod).await?;
        tracing::debug!(alias, %pod, %node, "cordoned node");
        Ok(true)
    }
}

#[async_trait]
impl<R: KubeRunner> ActionVerifier for InstallVerifier<R> {
    async fn is_action(&self, alias: &str, action: Action) -> Result<bool> {
        tracing::debug!(alias, %action, "performing action");

        match action {
            Action::DeleteAnyPod => self.delete_any_pod(alias).await,
            Action::DeleteOldestPod => self.delete_oldest_pod(alias).await,
            Action::CordonNodeWithOldestPod => self.cordon_node_with_oldest_pod(alias).await,
        }
    }
}
