//! Cluster queries and commands
//!
//! Thin wrappers pairing one kubectl command with the parser for its output.
//! The runner passed in decides the namespace; label selectors are passed
//! explicitly where the query needs them.

use crate::error::{Result, VerifyError};
use crate::parse;
use crate::runner::KubeRunner;

const JSONPATH_READY_ALL: &str = "jsonpath={.items[*].status.containerStatuses[*].ready}";
const JSONPATH_READY_ONE: &str = "jsonpath={.status.containerStatuses[*].ready}";
const JSONPATH_NODE_NAMES: &str = "jsonpath={.items[*].spec.nodeName}";
const JSONPATH_NAMES: &str = "jsonpath={.items[*].metadata.name}";
const JSONPATH_NAME: &str = "jsonpath={.metadata.name}";
const JSONPATH_NODE_NAME: &str = "jsonpath={.spec.nodeName}";
const JSONPATH_PHASES: &str = "jsonpath={.items[*].status.phase}";
const JSONPATH_CLUSTER_IP: &str = "jsonpath={.spec.clusterIP}";
const JSONPATH_VOLUME_NAME: &str = "jsonpath={.spec.volumeName}";

/// Sort order that puts the oldest pod first
const SORT_BY_CREATION: &str = "--sort-by=.metadata.creationTimestamp";

/// Check that every container of every selected pod is ready
pub async fn are_pods_running<R: KubeRunner>(runner: &R, labels: &str) -> Result<bool> {
    let output = runner
        .run(&["get", "pods", "-o", JSONPATH_READY_ALL], Some(labels))
        .await?;
    parse::require_running(&format!("pods '{}'", labels), &output)
}

/// Check that every container of the named pod is ready
pub async fn is_pod_running<R: KubeRunner>(runner: &R, name: &str) -> Result<bool> {
    let output = runner
        .run(&["get", "pods", name, "-o", JSONPATH_READY_ONE], None)
        .await?;
    parse::require_running(&format!("pod '{}'", name), &output)
}

/// Nodes hosting the selected pods, one entry per pod
pub async fn pod_nodes<R: KubeRunner>(runner: &R, labels: &str) -> Result<Vec<String>> {
    let output = runner
        .run(&["get", "pods", "-o", JSONPATH_NODE_NAMES], Some(labels))
        .await?;
    Ok(parse::split_tokens(&output))
}

/// Names of every node registered to the cluster
pub async fn node_names<R: KubeRunner>(runner: &R) -> Result<Vec<String>> {
    let output = runner
        .run(&["get", "nodes", "-o", JSONPATH_NAMES], None)
        .await?;
    Ok(parse::split_tokens(&output))
}

/// Names of the selected pods whose containers are all ready
pub async fn running_pods<R: KubeRunner>(runner: &R, labels: &str) -> Result<Vec<String>> {
    let output = runner
        .run(&["get", "pods", "-o", parse::POD_READINESS_TEMPLATE], Some(labels))
        .await?;
    Ok(parse::running_pods(&output))
}

/// Oldest of the selected pods whose containers are all ready
pub async fn oldest_running_pod<R: KubeRunner>(runner: &R, labels: &str) -> Result<Option<String>> {
    let output = runner
        .run(
            &["get", "pods", SORT_BY_CREATION, "-o", parse::POD_READINESS_TEMPLATE],
            Some(labels),
        )
        .await?;
    Ok(parse::oldest_running_pod(&output))
}

/// Phases of the selected pods must all be `Succeeded`
pub async fn are_job_pods_completed<R: KubeRunner>(runner: &R, labels: &str) -> Result<bool> {
    let output = runner
        .run(&["get", "pods", "-o", JSONPATH_PHASES], Some(labels))
        .await?;
    parse::require_all_succeeded(&output)
}

/// Node the named pod is scheduled on
pub async fn pod_node<R: KubeRunner>(runner: &R, pod: &str) -> Result<Option<String>> {
    let output = runner
        .run(&["get", "pods", pod, "-o", JSONPATH_NODE_NAME], None)
        .await?;
    let node = parse::normalize(&output);
    Ok((!node.is_empty()).then(|| node.to_string()))
}

pub async fn delete_pod<R: KubeRunner>(runner: &R, pod: &str) -> Result<()> {
    tracing::info!(pod, "deleting pod");
    runner.run(&["delete", "pods", pod], None).await?;
    Ok(())
}

pub async fn cordon_node<R: KubeRunner>(runner: &R, node: &str) -> Result<()> {
    tracing::info!(node, "cordoning node");
    runner.run(&["cordon", node], None).await?;
    Ok(())
}

pub async fn uncordon_node<R: KubeRunner>(runner: &R, node: &str) -> Result<()> {
    tracing::info!(node, "uncordoning node");
    runner.run(&["uncordon", node], None).await?;
    Ok(())
}

/// Cordon the node hosting the named pod
pub async fn cordon_node_with_pod<R: KubeRunner>(runner: &R, pod: &str) -> Result<String> {
    let node = pod_node(runner, pod)
        .await?
        .ok_or_else(|| VerifyError::NodeNotFound {
            pod: pod.to_string(),
        })?;
    cordon_node(runner, &node).await?;
    Ok(node)
}

/// Cluster IP of the named service, as printed by kubectl
pub async fn service_ip<R: KubeRunner>(runner: &R, service: &str) -> Result<String> {
    let output = runner
        .run(&["get", "services", service, "-o", JSONPATH_CLUSTER_IP], None)
        .await?;
    Ok(parse::normalize(&output).to_string())
}

/// Volume bound to the named claim
pub async fn pvc_volume<R: KubeRunner>(runner: &R, claim: &str) -> Result<Option<String>> {
    let output = runner
        .run(&["get", "pvc", claim, "-o", JSONPATH_VOLUME_NAME], None)
        .await?;
    Ok(parse::bound_volume(&output))
}

/// Name of the resource if it exists, looked up by name
pub async fn resource_by_name<R: KubeRunner>(runner: &R, kind: &str, name: &str) -> Result<String> {
    let output = runner
        .run(&["get", kind, name, "-o", JSONPATH_NAME], None)
        .await?;
    Ok(parse::normalize(&output).to_string())
}

/// Names of the resources matching the selector
pub async fn resources_by_labels<R: KubeRunner>(
    runner: &R,
    kind: &str,
    labels: &str,
) -> Result<String> {
    let output = runner
        .run(&["get", kind, "-o", JSONPATH_NAMES], Some(labels))
        .await?;
    Ok(parse::normalize(&output).to_string())
}
