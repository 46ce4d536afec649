//! Condition command - evaluate a named condition against an alias

use litmus_kube::{Condition, ConditionVerifier, InstallVerifier, Kubectl};

use crate::display;
use crate::error::Result;

pub async fn run(kubectl: Kubectl, file: &str, alias: &str, condition: &str) -> Result<bool> {
    let condition: Condition = condition.parse()?;
    let verifier = InstallVerifier::load(file, kubectl)?;

    let holds = verifier.is_condition(alias, condition).await?;
    Ok(display::verdict(holds, alias, condition.as_str()))
}
