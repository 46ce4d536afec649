//! Named conditions evaluated against aliased components

use async_trait::async_trait;
use litmus_core::{Category, is_pod, is_pvc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VerifyError};
use crate::parse;
use crate::queries;
use crate::runner::KubeRunner;
use crate::verify::{ConditionVerifier, InstallVerifier};

/// A stateless check, evaluated fresh on every call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// No two pods of the aliased components share a node
    #[serde(rename = "is-unique-node")]
    UniqueNode,

    /// Declared for descriptors but never evaluated
    #[serde(rename = "is-three-replicas")]
    ThreeReplicas,

    #[serde(rename = "is-pvc-bound")]
    PvcBound,

    #[serde(rename = "is-pvc-unbound")]
    PvcUnbound,

    /// The cluster has more than one node
    #[serde(rename = "is-multi-node-k8s-cluster")]
    MultiNodeCluster,

    /// Every pod of the aliased job has succeeded
    #[serde(rename = "is-job-completed")]
    JobCompleted,
}

impl Condition {
    pub const ALL: [Condition; 6] = [
        Condition::UniqueNode,
        Condition::ThreeReplicas,
        Condition::PvcBound,
        Condition::PvcUnbound,
        Condition::MultiNodeCluster,
        Condition::JobCompleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::UniqueNode => "is-unique-node",
            Condition::ThreeReplicas => "is-three-replicas",
            Condition::PvcBound => "is-pvc-bound",
            Condition::PvcUnbound => "is-pvc-unbound",
            Condition::MultiNodeCluster => "is-multi-node-k8s-cluster",
            Condition::JobCompleted => "is-job-completed",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| VerifyError::UnsupportedCondition(s.to_string()))
    }
}

/// Count distinct node names reported by the cluster
pub(crate) async fn distinct_node_count<R: KubeRunner>(runner: &R) -> Result<usize> {
    let nodes = queries::node_names(runner).await?;
    Ok(nodes.iter().collect::<HashSet<_>>().len())
}

impl<R: KubeRunner> InstallVerifier<R> {
    async fn is_each_component_on_unique_node(&self, alias: &str) -> Result<bool> {
        let mut nodes = Vec::new();

        for component in self.installation.with_alias(alias) {
            if !is_pod(component.kind()) {
                continue;
            }

            let labels = component
                .selector()
                .ok_or_else(|| VerifyError::MissingSelector {
                    operation: "node lookup",
                    kind: component.kind().to_string(),
                    alias: alias.to_string(),
                })?;

            let runner = self.runner_for(component);
            nodes.extend(queries::pod_nodes(&runner, labels).await?);
        }

        if nodes.is_empty() {
            return Err(VerifyError::NoNodesDetermined {
                alias: alias.to_string(),
            });
        }

        if let Some(index) = parse::first_duplicate(&nodes) {
            tracing::debug!(alias, node = %nodes[index], "pods share a node");
            return Ok(false);
        }

        Ok(true)
    }

    /// Volume bound to the pvc behind `alias`, if any
    async fn bound_volume(&self, alias: &str) -> Result<Option<String>> {
        let component = self.installation.resolve(alias, Category::Any)?;

        let name = component.name().ok_or_else(|| VerifyError::MissingName {
            operation: "pvc lookup",
            component: component.to_string(),
        })?;

        if !is_pvc(component.kind()) {
            return Err(VerifyError::NotAPvc {
                alias: alias.to_string(),
                kind: component.kind().to_string(),
            });
        }

        queries::pvc_volume(&self.runner_for(component), name).await
    }

    async fn is_pvc_bound(&self, alias: &str) -> Result<bool> {
        match self.bound_volume(alias).await? {
            Some(_) => Ok(true),
            None => Err(VerifyError::PvcNotBound {
                alias: alias.to_string(),
            }),
        }
    }

    async fn is_pvc_unbound(&self, alias: &str) -> Result<bool> {
        match self.bound_volume(alias).await? {
            None => Ok(true),
            Some(volume) => Err(VerifyError::PvcBound {
                alias: alias.to_string(),
                volume,
            }),
        }
    }

    async fn is_job_completed(&self, alias: &str) -> Result<bool> {
        let component = self.installation.pod_component(alias)?;
        let labels = component
            .selector()
            .ok_or_else(|| VerifyError::MissingSelector {
                operation: "job completion check",
                kind: component.kind().to_string(),
                alias: alias.to_string(),
            })?;

        queries::are_job_pods_completed(&self.runner_for(component), labels).await
    }
}

#[async_trait]
impl<R: KubeRunner> ConditionVerifier for InstallVerifier<R> {
    async fn is_condition(&self, alias: &str, condition: Condition) -> Result<bool> {
        tracing::debug!(alias, %condition, "evaluating condition");

        match condition {
            Condition::UniqueNode => self.is_each_component_on_unique_node(alias).await,
            Condition::ThreeReplicas => Err(VerifyError::NotImplemented(condition)),
            Condition::PvcBound => self.is_pvc_bound(alias).await,
            Condition::PvcUnbound => self.is_pvc_unbound(alias).await,
            Condition::MultiNodeCluster => Ok(distinct_node_count(&self.runner).await? > 1),
            Condition::JobCompleted => self.is_job_completed(alias).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::runner::MockKubeRunner;
    use litmus_core::{CoreError, Installation};

    const REPLICAS: &str = r#"
components:
  - kind: pod
    namespace: openebs
    labels: app=vol
    alias: volume-replica
  - kind: pod
    namespace: openebs
    labels: app=vol
    alias: volume-replica
  - kind: pod
    namespace: openebs
    labels: app=vol
    alias: volume-replica
  - kind: pvc
    namespace: default
    name: demo-claim
    alias: claim
  - kind: deployment
    namespace: default
    name: percona
    alias: percona
  - kind: job
    namespace: default
    labels: job-name=fio
    alias: fio
"#;

    fn verifier(runner: MockKubeRunner) -> InstallVerifier<MockKubeRunner> {
        InstallVerifier::new(Installation::from_yaml(REPLICAS).unwrap(), runner)
    }

    fn replicas_on(nodes: [&str; 3]) -> MockKubeRunner {
        nodes.into_iter().fold(MockKubeRunner::new(), |runner, node| {
            runner.once("spec.nodeName", node)
        })
    }

    #[test]
    fn test_condition_from_str() {
        for condition in Condition::ALL {
            assert_eq!(condition.to_string().parse::<Condition>().unwrap(), condition);
        }
        assert_eq!(
            " is-pvc-bound ".parse::<Condition>().unwrap(),
            Condition::PvcBound
        );
        assert!(matches!(
            "is-green".parse::<Condition>(),
            Err(VerifyError::UnsupportedCondition(tag)) if tag == "is-green"
        ));
    }

    #[test]
    fn test_condition_serde_tags() {
        let condition: Condition = serde_yaml::from_str("is-multi-node-k8s-cluster").unwrap();
        assert_eq!(condition, Condition::MultiNodeCluster);
    }

    #[tokio::test]
    async fn test_unique_node_distinct_nodes() {
        let runner = replicas_on(["node-a", "node-b", "node-c"]);
        let verifier = verifier(runner.clone());

        let result = verifier
            .is_condition("volume-replica", Condition::UniqueNode)
            .await;
        assert!(result.unwrap());

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.namespace == "openebs"));
        assert!(calls.iter().all(|c| c.labels.as_deref() == Some("app=vol")));
    }

    #[tokio::test]
    async fn test_unique_node_shared_node() {
        let verifier = verifier(replicas_on(["node-a", "node-b", "node-a"]));

        let result = verifier
            .is_condition("volume-replica", Condition::UniqueNode)
            .await;
        assert!(!result.unwrap());
    }

    #[tokio::test]
    async fn test_unique_node_without_nodes() {
        let verifier = verifier(replicas_on(["", " ", "''"]));

        let err = verifier
            .is_condition("volume-replica", Condition::UniqueNode)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::NoNodesDetermined { .. }));

        // Unknown alias contributes no nodes either
        let verifier = self::verifier(MockKubeRunner::new());
        assert!(matches!(
            verifier.is_condition("missing", Condition::UniqueNode).await,
            Err(VerifyError::NoNodesDetermined { .. })
        ));
    }

    #[tokio::test]
    async fn test_unique_node_requires_labels() {
        let installation = Installation::from_yaml(
            "components:\n  - kind: sts\n    name: db\n    alias: db\n",
        )
        .unwrap();
        let verifier = InstallVerifier::new(installation, MockKubeRunner::new());

        let err = verifier
            .is_condition("db", Condition::UniqueNode)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::MissingSelector { .. }));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[tokio::test]
    async fn test_three_replicas_is_not_implemented() {
        let runner = MockKubeRunner::new();
        let verifier = verifier(runner.clone());

        let err = verifier
            .is_condition("volume-replica", Condition::ThreeReplicas)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::NotImplemented(Condition::ThreeReplicas)));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pvc_bound_and_unbound_are_inverse() {
        let bound = verifier(MockKubeRunner::new().on("get pvc demo-claim", "pvc-8c1a"));
        assert!(bound.is_condition("claim", Condition::PvcBound).await.unwrap());
        match bound.is_condition("claim", Condition::PvcUnbound).await {
            Err(VerifyError::PvcBound { volume, .. }) => assert_eq!(volume, "pvc-8c1a"),
            other => panic!("expected bound pvc, got {:?}", other),
        }

        let unbound = verifier(MockKubeRunner::new().on("get pvc demo-claim", "  "));
        assert!(unbound.is_condition("claim", Condition::PvcUnbound).await.unwrap());
        assert!(matches!(
            unbound.is_condition("claim", Condition::PvcBound).await,
            Err(VerifyError::PvcNotBound { .. })
        ));
    }

    #[tokio::test]
    async fn test_pvc_condition_shape_errors() {
        let verifier = verifier(MockKubeRunner::new());

        assert!(matches!(
            verifier.is_condition("percona", Condition::PvcBound).await,
            Err(VerifyError::NotAPvc { .. })
        ));

        // Three components share the alias
        match verifier.is_condition("volume-replica", Condition::PvcBound).await {
            Err(VerifyError::Core(CoreError::AmbiguousAlias { count, .. })) => assert_eq!(count, 3),
            other => panic!("expected ambiguous alias, got {:?}", other),
        }

        match verifier.is_condition("volume-replica", Condition::PvcUnbound).await {
            Err(e) => assert_eq!(e.category(), ErrorCategory::Resolution),
            Ok(v) => panic!("expected resolution error, got {}", v),
        }
    }

    #[tokio::test]
    async fn test_pvc_requires_name() {
        let installation = Installation::from_yaml(
            "components:\n  - kind: pvc\n    labels: app=db\n    alias: claim\n",
        )
        .unwrap();
        let verifier = InstallVerifier::new(installation, MockKubeRunner::new());

        assert!(matches!(
            verifier.is_condition("claim", Condition::PvcBound).await,
            Err(VerifyError::MissingName { .. })
        ));
    }

    #[tokio::test]
    async fn test_job_completed() {
        let runner = MockKubeRunner::new()
            .once("--selector=job-name=fio", "Succeeded Succeeded")
            .once("--selector=job-name=fio", "Succeeded Running");
        let verifier = verifier(runner);

        assert!(verifier.is_condition("fio", Condition::JobCompleted).await.unwrap());
        assert!(matches!(
            verifier.is_condition("fio", Condition::JobCompleted).await,
            Err(VerifyError::JobNotCompleted { .. })
        ));
    }

    #[tokio::test]
    async fn test_multi_node_cluster() {
        let runner = MockKubeRunner::new()
            .once("get nodes", "node-a node-b")
            .once("get nodes", "minikube")
            .once("get nodes", "");
        let verifier = verifier(runner);

        assert!(verifier.is_condition("", Condition::MultiNodeCluster).await.unwrap());
        assert!(!verifier.is_condition("", Condition::MultiNodeCluster).await.unwrap());
        assert!(!verifier.is_condition("", Condition::MultiNodeCluster).await.unwrap());
    }
}
