//! Core error types

use thiserror::Error;

use crate::kind::Category;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("failed to load installation: descriptor is not provided")]
    DescriptorNotProvided,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("{category} component not found for alias '{alias}'")]
    NoMatchingComponent { alias: String, category: Category },

    #[error("{count} {category} components found for alias '{alias}': alias should be unique in an installation")]
    AmbiguousAlias {
        alias: String,
        category: Category,
        count: usize,
    },
}

impl CoreError {
    /// Whether the error comes from alias resolution rather than loading
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            CoreError::NoMatchingComponent { .. } | CoreError::AmbiguousAlias { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
