//! Installation-level verification
//!
//! Capabilities are split into small async traits so callers can depend on
//! only what they use. [`InstallVerifier`] implements all of them over a
//! loaded [`Installation`] and a [`KubeRunner`].
//!
//! Every check walks components in declaration order and stops at the first
//! one that does not hold or fails; later components are not inspected.

use async_trait::async_trait;
use litmus_core::{Component, Installation};
use std::path::Path;

use crate::actions::Action;
use crate::conditions::Condition;
use crate::error::{Result, VerifyError};
use crate::parse;
use crate::queries;
use crate::runner::KubeRunner;

/// Kind selected by [`RunVerifier::is_running`]
///
/// Narrower than the pod-like family: deployments and other controllers are
/// only checked for presence.
const RUNNING_KIND: &str = "pod";

/// Text kubectl prints when a selector matches nothing
const NO_RESOURCES: &str = "No resources found";

#[async_trait]
pub trait DeployVerifier: Send + Sync {
    /// Check that every component exists in the cluster
    async fn is_deployed(&self) -> Result<bool>;
}

#[async_trait]
pub trait RunVerifier: Send + Sync {
    /// Check that every pod component has all containers ready
    async fn is_running(&self) -> Result<bool>;
}

#[async_trait]
pub trait DeleteVerifier: Send + Sync {
    /// Check that no component exists in the cluster anymore
    async fn is_deleted(&self) -> Result<bool>;
}

#[async_trait]
pub trait ConditionVerifier: Send + Sync {
    async fn is_condition(&self, alias: &str, condition: Condition) -> Result<bool>;
}

#[async_trait]
pub trait ActionVerifier: Send + Sync {
    async fn is_action(&self, alias: &str, action: Action) -> Result<bool>;
}

#[async_trait]
pub trait ConnectVerifier: Send + Sync {
    /// Check that the cluster answers
    async fn is_connected(&self) -> Result<bool>;
}

/// Deployment and running checks together
pub trait DeployRunVerifier: DeployVerifier + RunVerifier {}

impl<T: DeployVerifier + RunVerifier> DeployRunVerifier for T {}

/// Every installation-scoped capability
pub trait AllVerifier:
    DeployVerifier + RunVerifier + DeleteVerifier + ConditionVerifier + ActionVerifier
{
}

impl<T> AllVerifier for T where
    T: DeployVerifier + RunVerifier + DeleteVerifier + ConditionVerifier + ActionVerifier
{
}

/// Verifies an installation against a cluster
#[derive(Debug, Clone)]
pub struct InstallVerifier<R: KubeRunner> {
    pub(crate) installation: Installation,
    pub(crate) runner: R,
}

impl<R: KubeRunner> InstallVerifier<R> {
    pub fn new(installation: Installation, runner: R) -> Self {
        Self {
            installation,
            runner,
        }
    }

    /// Load the installation descriptor at `path`
    pub fn load(path: impl AsRef<Path>, runner: R) -> Result<Self> {
        Ok(Self::new(Installation::load(path)?, runner))
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    /// Runner scoped to the component's namespace
    pub(crate) fn runner_for(&self, component: &Component) -> R {
        self.runner.with_namespace(&component.namespace)
    }

    async fn is_component_deployed(&self, component: &Component) -> Result<bool> {
        let kind = required_kind(component)?;
        let runner = self.runner_for(component);

        let output = match (component.name(), component.selector()) {
            (Some(name), _) => queries::resource_by_name(&runner, kind, name).await?,
            (None, Some(labels)) => queries::resources_by_labels(&runner, kind, labels).await?,
            (None, None) => return Err(insufficient_selector(component)),
        };

        Ok(!output.is_empty())
    }

    async fn is_component_running(&self, component: &Component) -> Result<bool> {
        let runner = self.runner_for(component);

        match (component.name(), component.selector()) {
            (Some(name), _) => queries::is_pod_running(&runner, name).await,
            (None, Some(labels)) => queries::are_pods_running(&runner, labels).await,
            (None, None) => Err(insufficient_selector(component)),
        }
    }

    async fn is_component_deleted(&self, component: &Component) -> Result<bool> {
        let kind = required_kind(component)?;
        let runner = self.runner_for(component);

        match (component.name(), component.selector()) {
            (Some(name), _) => match runner.run(&["get", kind, name], None).await {
                Ok(output) => Err(VerifyError::NotDeleted {
                    component: component.to_string(),
                    output: parse::normalize(&output).to_string(),
                }),
                Err(e) if e.is_not_found() => Ok(true),
                Err(e) => Err(VerifyError::DeleteStatusUnknown {
                    component: component.to_string(),
                    output: e.to_string(),
                }),
            },
            (None, Some(labels)) => {
                let output = runner.run(&["get", kind], Some(labels)).await?;
                let output = parse::normalize(&output);
                if output.is_empty() || output.contains(NO_RESOURCES) {
                    Ok(true)
                } else {
                    Err(VerifyError::DeleteStatusUnknown {
                        component: component.to_string(),
                        output: output.to_string(),
                    })
                }
            }
            (None, None) => Err(insufficient_selector(component)),
        }
    }
}

fn required_kind(component: &Component) -> Result<&str> {
    let kind = component.kind();
    if kind.is_empty() {
        return Err(VerifyError::MissingKind {
            component: format!("{:?}", component),
        });
    }
    Ok(kind)
}

fn insufficient_selector(component: &Component) -> VerifyError {
    VerifyError::InsufficientSelector {
        component: component.to_string(),
    }
}

#[async_trait]
impl<R: KubeRunner> DeployVerifier for InstallVerifier<R> {
    async fn is_deployed(&self) -> Result<bool> {
        if self.installation.is_empty() {
            return Ok(false);
        }

        for component in &self.installation.components {
            if !self.is_component_deployed(component).await? {
                tracing::debug!(%component, "component is not deployed");
                return Ok(false);
            }
            tracing::debug!(%component, "component is deployed");
        }

        Ok(true)
    }
}

#[async_trait]
impl<R: KubeRunner> RunVerifier for InstallVerifier<R> {
    async fn is_running(&self) -> Result<bool> {
        let mut checked = 0;

        for component in &self.installation.components {
            if component.kind() != RUNNING_KIND {
                continue;
            }
            if !self.is_component_running(component).await? {
                return Ok(false);
            }
            tracing::debug!(%component, "component is running");
            checked += 1;
        }

        Ok(checked > 0)
    }
}

#[async_trait]
impl<R: KubeRunner> DeleteVerifier for InstallVerifier<R> {
    async fn is_deleted(&self) -> Result<bool> {
        if self.installation.is_empty() {
            return Ok(false);
        }

        for component in &self.installation.components {
            if !self.is_component_deleted(component).await? {
                return Ok(false);
            }
            tracing::debug!(%component, "component is deleted");
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::runner::MockKubeRunner;

    const DESCRIPTOR: &str = r#"
version: 0.6.0
components:
  - kind: serviceaccount
    namespace: openebs
    name: openebs-maya-operator
    alias: maya-sa
  - kind: deployment
    namespace: openebs
    name: maya-apiserver
    alias: maya-api
  - kind: pod
    namespace: openebs
    labels: name=maya-apiserver
    alias: maya-api-pod
"#;

    fn verifier(runner: MockKubeRunner) -> InstallVerifier<MockKubeRunner> {
        InstallVerifier::new(Installation::from_yaml(DESCRIPTOR).unwrap(), runner)
    }

    #[tokio::test]
    async fn test_is_deployed() {
        let runner = MockKubeRunner::new()
            .on("get serviceaccount openebs-maya-operator", "openebs-maya-operator")
            .on("get deployment maya-apiserver", "'maya-apiserver'")
            .on("get pod -o", "maya-apiserver-7f9c-x2k");
        let verifier = verifier(runner.clone());

        assert!(verifier.is_deployed().await.unwrap());

        let commands = runner.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[2],
            "get pod -o jsonpath={.items[*].metadata.name} --namespace=openebs --selector=name=maya-apiserver"
        );
    }

    #[tokio::test]
    async fn test_is_deployed_stops_at_first_missing() {
        let runner = MockKubeRunner::new()
            .on("get serviceaccount", "")
            .on("get deployment", "maya-apiserver");
        let verifier = verifier(runner.clone());

        assert!(!verifier.is_deployed().await.unwrap());
        assert_eq!(runner.count("get deployment"), 0);
    }

    #[tokio::test]
    async fn test_is_deployed_propagates_command_error() {
        let runner = MockKubeRunner::new()
            .on("get serviceaccount", "openebs-maya-operator")
            .fail("get deployment", "Error from server (NotFound): deployments.apps \"maya-apiserver\" not found");
        let verifier = verifier(runner.clone());

        let err = verifier.is_deployed().await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Command);
        assert_eq!(runner.count("get pod"), 0);
    }

    #[tokio::test]
    async fn test_is_deployed_requires_kind_and_selector() {
        let installation = Installation::from_yaml(
            "components:\n  - name: x\n    alias: a\n",
        )
        .unwrap();
        let verifier = InstallVerifier::new(installation, MockKubeRunner::new());
        assert!(matches!(
            verifier.is_deployed().await,
            Err(VerifyError::MissingKind { .. })
        ));

        let installation = Installation::from_yaml(
            "components:\n  - kind: pod\n    alias: a\n",
        )
        .unwrap();
        let verifier = InstallVerifier::new(installation, MockKubeRunner::new());
        assert!(matches!(
            verifier.is_deployed().await,
            Err(VerifyError::InsufficientSelector { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_installation_is_not_deployed() {
        let verifier = InstallVerifier::new(Installation::default(), MockKubeRunner::new());
        assert!(!verifier.is_deployed().await.unwrap());
        assert!(!verifier.is_deleted().await.unwrap());
        assert!(!verifier.is_running().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_running_only_checks_pod_kind() {
        let runner = MockKubeRunner::new().on("get pods -o", "true true");
        let verifier = verifier(runner.clone());

        assert!(verifier.is_running().await.unwrap());

        // The deployment component is not checked for readiness
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].labels.as_deref(), Some("name=maya-apiserver"));
        assert_eq!(calls[0].namespace, "openebs");
    }

    #[tokio::test]
    async fn test_is_running_not_ready() {
        let runner = MockKubeRunner::new().on("get pods -o", "true false");
        let verifier = verifier(runner);

        let err = verifier.is_running().await.unwrap_err();
        assert!(matches!(err, VerifyError::NotRunning { .. }));
        assert_eq!(err.category(), ErrorCategory::Verdict);
    }

    #[tokio::test]
    async fn test_is_running_without_pods() {
        let installation = Installation::from_yaml(
            "components:\n  - kind: deployment\n    name: web\n    alias: web\n",
        )
        .unwrap();
        let runner = MockKubeRunner::new();
        let verifier = InstallVerifier::new(installation, runner.clone());

        assert!(!verifier.is_running().await.unwrap());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_is_deleted() {
        let runner = MockKubeRunner::new()
            .fail("get serviceaccount", "Error from server (NotFound): serviceaccounts \"openebs-maya-operator\" not found")
            .fail("get deployment", "Error from server (NotFound): deployments.apps \"maya-apiserver\" not found")
            .on("get pod --namespace=openebs --selector=name=maya-apiserver", "No resources found.");
        let verifier = verifier(runner);

        assert!(verifier.is_deleted().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_deleted_with_namespace_prefix() {
        let runner = MockKubeRunner::new()
            .fail("get serviceaccount", "Error from server (NotFound): serviceaccounts \"openebs-maya-operator\" not found")
            .fail("get deployment", "Error from server (NotFound): deployments.apps \"maya-apiserver\" not found")
            .on(
                "get pod --namespace=openebs --selector=name=maya-apiserver",
                "W1015 10:02:11.512 warnings.go:70] client-side throttling\nNo resources found in openebs namespace.",
            );
        let verifier = verifier(runner);

        assert!(verifier.is_deleted().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_deleted_when_resource_still_exists() {
        let runner = MockKubeRunner::new().on(
            "get serviceaccount",
            "NAME                    SECRETS   AGE\nopenebs-maya-operator   1         3m",
        );
        let verifier = verifier(runner.clone());

        match verifier.is_deleted().await {
            Err(VerifyError::NotDeleted { component, .. }) => {
                assert!(component.contains("openebs-maya-operator"))
            }
            other => panic!("expected not deleted, got {:?}", other),
        }
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_is_deleted_unknown_status() {
        let runner = MockKubeRunner::new()
            .fail("get serviceaccount", "Unable to connect to the server");
        let verifier = verifier(runner);

        let err = verifier.is_deleted().await.unwrap_err();
        assert!(matches!(err, VerifyError::DeleteStatusUnknown { .. }));
        assert_eq!(err.category(), ErrorCategory::StatusIndeterminate);
    }

    #[tokio::test]
    async fn test_is_deleted_selector_still_matches() {
        let installation = Installation::from_yaml(
            "components:\n  - kind: pod\n    labels: app=db\n    alias: db\n",
        )
        .unwrap();
        let runner = MockKubeRunner::new().on("get pod", "db-0   1/1   Running");
        let verifier = InstallVerifier::new(installation, runner);

        assert!(matches!(
            verifier.is_deleted().await,
            Err(VerifyError::DeleteStatusUnknown { .. })
        ));
    }

    #[test]
    fn test_load_missing_descriptor() {
        let result = InstallVerifier::load("", MockKubeRunner::new());
        assert!(matches!(
            result,
            Err(VerifyError::Core(litmus_core::CoreError::DescriptorNotProvided))
        ));
    }

    #[tokio::test]
    async fn test_composite_traits() {
        async fn check(verifier: &dyn AllVerifier) -> Result<bool> {
            Ok(verifier.is_deployed().await? && verifier.is_running().await?)
        }

        let runner = MockKubeRunner::new()
            .on("get serviceaccount", "openebs-maya-operator")
            .on("get deployment", "maya-apiserver")
            .on("-o jsonpath={.items[*].metadata.name}", "maya-apiserver-7f9c-x2k")
            .on("containerStatuses", "true");
        let verifier = verifier(runner);

        assert!(check(&verifier).await.unwrap());
    }
}
