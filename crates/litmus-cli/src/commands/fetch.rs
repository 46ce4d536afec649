//! Fetch command - print a property of an aliased component

use litmus_kube::{Fetcher, Kubectl, Property, ResourceFetcher};

use crate::error::{CliError, Result};

pub async fn run(
    kubectl: Kubectl,
    file: &str,
    alias: &str,
    property: &str,
    output_json: bool,
) -> Result<bool> {
    let property: Property = property.parse()?;
    let fetcher = ResourceFetcher::load(file, kubectl)?;

    let values = fetcher.fetch(alias, property).await?;

    if output_json {
        let json = serde_json::to_string_pretty(&values).map_err(CliError::internal)?;
        println!("{}", json);
    } else {
        for value in &values {
            println!("{}", value);
        }
    }

    Ok(true)
}
