//! Cluster commands - connectivity, node housekeeping and manifests

use console::style;
use litmus_kube::{ClusterVerifier, ConnectVerifier, Kubectl};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::display;
use crate::error::{CliError, Result};

/// Manifest path that reads the manifest from standard input
const STDIN_MANIFEST: &str = "-";

pub async fn connected(kubectl: Kubectl) -> Result<bool> {
    let namespace = kubectl.namespace().to_string();
    let verifier = ClusterVerifier::new(kubectl);

    let holds = verifier.is_connected().await?;
    Ok(display::verdict(holds, &namespace, "reachable"))
}

pub async fn uncordon_all(kubectl: Kubectl, ignore_errors: bool) -> Result<bool> {
    let verifier = ClusterVerifier::new(kubectl);

    let nodes = verifier.uncordon_all_nodes(ignore_errors).await?;
    for node in &nodes {
        println!("{} {} uncordoned", style("✓").green().bold(), style(node).cyan());
    }
    if nodes.is_empty() {
        println!("{}", style("No nodes were uncordoned").dim());
    }

    Ok(true)
}

pub async fn apply(kubectl: Kubectl, manifest: &Path) -> Result<bool> {
    let verifier = ClusterVerifier::new(kubectl);

    if manifest != Path::new(STDIN_MANIFEST) {
        display::step("Applying", &manifest.display().to_string());
        verifier.apply_manifest(manifest).await?;
        return Ok(true);
    }

    let mut input = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut input)
        .await
        .map_err(CliError::internal)?;

    display::step("Applying", "manifest from stdin");
    let output = verifier.apply_stdin(&input).await?;
    if !output.trim().is_empty() {
        println!("{}", style(output.trim()).dim());
    }

    Ok(true)
}

pub async fn teardown(kubectl: Kubectl, manifest: &Path) -> Result<bool> {
    display::step("Deleting", &manifest.display().to_string());
    ClusterVerifier::new(kubectl).delete_manifest(manifest).await?;
    Ok(true)
}
