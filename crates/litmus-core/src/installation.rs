//! Installation descriptors and loading

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{CoreError, Result};

/// A set of components that together form an installation
///
/// e.g. an operator represented by its CRDs, RBACs and Deployments. The
/// descriptor is read once and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    /// Version of this installation
    #[serde(default, with = "version_serde")]
    pub version: String,

    /// Components in declaration order
    #[serde(default)]
    pub components: Vec<Component>,
}

/// A single Kubernetes resource that is part of an installation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Resource name
    #[serde(default)]
    pub name: Option<String>,

    /// Namespace of the resource
    #[serde(default)]
    pub namespace: String,

    /// Kind as understood by kubectl, e.g. `pod`, `deployment`, `svc`
    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub api_version: String,

    /// Label selector, e.g. `name=app` or `name=app,env=prod`
    #[serde(default)]
    pub labels: Option<String>,

    /// Short user-facing label used by conditions and actions
    #[serde(default)]
    pub alias: String,
}

impl Component {
    /// Resource name, if set to something other than whitespace
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// Label selector, if set to something other than whitespace
    pub fn selector(&self) -> Option<&str> {
        non_blank(self.labels.as_deref())
    }

    /// Kind with surrounding whitespace removed
    pub fn kind(&self) -> &str {
        self.kind.trim()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        match (self.name(), self.selector()) {
            (Some(name), _) => write!(f, " '{}'", name)?,
            (None, Some(labels)) => write!(f, " [{}]", labels)?,
            (None, None) => {}
        }
        if !self.namespace.is_empty() {
            write!(f, " in namespace '{}'", self.namespace)?;
        }
        if !self.alias.is_empty() {
            write!(f, " (alias '{}')", self.alias)?;
        }
        Ok(())
    }
}

/// Versions such as `0.7` parse as YAML numbers; keep them as text
mod version_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(version: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(version)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match serde_yaml::Value::deserialize(deserializer)? {
            serde_yaml::Value::String(s) => Ok(s),
            serde_yaml::Value::Number(n) => Ok(n.to_string()),
            serde_yaml::Value::Null => Ok(String::new()),
            other => Err(D::Error::custom(format!(
                "expected a version string, got {:?}",
                other
            ))),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Installation {
    /// Load an installation descriptor from a YAML file
    ///
    /// An empty path is rejected before touching the filesystem. IO and YAML
    /// failures are returned as-is.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(CoreError::DescriptorNotProvided);
        }

        let content = std::fs::read_to_string(path)?;
        let installation = Self::from_yaml(&content)?;
        tracing::debug!(
            path = %path.display(),
            components = installation.components.len(),
            "loaded installation"
        );
        Ok(installation)
    }

    /// Parse an installation from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Components tagged with the alias, in declaration order
    pub fn with_alias<'s: 'a, 'a>(
        &'s self,
        alias: &'a str,
    ) -> impl Iterator<Item = &'s Component> + 'a {
        self.components.iter().filter(move |c| c.alias == alias)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
