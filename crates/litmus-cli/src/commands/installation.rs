//! Deployed, running and deleted checks over a whole installation

use litmus_kube::{DeleteVerifier, DeployVerifier, InstallVerifier, Kubectl, RunVerifier};

use crate::display;
use crate::error::Result;

/// Installation-wide check to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Deployed,
    Running,
    Deleted,
}

impl Check {
    fn as_str(&self) -> &'static str {
        match self {
            Check::Deployed => "deployed",
            Check::Running => "running",
            Check::Deleted => "deleted",
        }
    }
}

pub async fn run(kubectl: Kubectl, file: &str, check: Check) -> Result<bool> {
    let verifier = InstallVerifier::load(file, kubectl)?;
    tracing::debug!(
        file,
        version = %verifier.installation().version,
        check = check.as_str(),
        "verifying installation"
    );

    let holds = match check {
        Check::Deployed => verifier.is_deployed().await?,
        Check::Running => verifier.is_running().await?,
        Check::Deleted => verifier.is_deleted().await?,
    };

    Ok(display::verdict(holds, file, check.as_str()))
}
