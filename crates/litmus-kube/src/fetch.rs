//! Property lookups on aliased components

use async_trait::async_trait;
use litmus_core::Installation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, VerifyError};
use crate::queries;
use crate::runner::KubeRunner;

/// A value that can be read off a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    /// Cluster IP of a service
    #[serde(rename = "service-ip")]
    ServiceIp,
}

impl Property {
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::ServiceIp => "service-ip",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "service-ip" => Ok(Property::ServiceIp),
            other => Err(VerifyError::UnsupportedProperty(other.to_string())),
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Values of `property` for the component behind `alias`
    async fn fetch(&self, alias: &str, property: Property) -> Result<Vec<String>>;
}

/// Reads properties of installation components from the cluster
#[derive(Debug, Clone)]
pub struct ResourceFetcher<R: KubeRunner> {
    installation: Installation,
    runner: R,
}

impl<R: KubeRunner> ResourceFetcher<R> {
    pub fn new(installation: Installation, runner: R) -> Self {
        Self {
            installation,
            runner,
        }
    }

    pub fn load(path: impl AsRef<Path>, runner: R) -> Result<Self> {
        Ok(Self::new(Installation::load(path)?, runner))
    }

    async fn service_ip(&self, alias: &str) -> Result<Vec<String>> {
        let component = self.installation.service_component(alias)?;
        let name = component.name().ok_or_else(|| VerifyError::MissingName {
            operation: "service ip lookup",
            component: component.to_string(),
        })?;

        let runner = self.runner.with_namespace(&component.namespace);
        let ip = queries::service_ip(&runner, name).await?;
        if ip.is_empty() {
            return Err(VerifyError::ServiceIpNotSet {
                alias: alias.to_string(),
            });
        }

        tracing::debug!(alias, %ip, "fetched service ip");
        Ok(vec![ip])
    }
}

#[async_trait]
impl<R: KubeRunner> Fetcher for ResourceFetcher<R> {
    async fn fetch(&self, alias: &str, property: Property) -> Result<Vec<String>> {
        match property {
            Property::ServiceIp => self.service_ip(alias).await,
        }
    }
}
