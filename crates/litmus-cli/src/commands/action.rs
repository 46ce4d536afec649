//! Action command - disrupt the pods behind an alias

use litmus_kube::{Action, ActionVerifier, InstallVerifier, Kubectl};

use crate::display;
use crate::error::Result;

pub async fn run(kubectl: Kubectl, file: &str, alias: &str, action: &str) -> Result<bool> {
    let action: Action = action.parse()?;
    let verifier = InstallVerifier::load(file, kubectl)?;

    display::step(action.as_str(), alias);
    let done = verifier.is_action(alias, action).await?;
    Ok(display::verdict(done, alias, "done"))
}
