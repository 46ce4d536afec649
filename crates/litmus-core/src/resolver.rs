//! Alias resolution
//!
//! Resolving an alias must yield exactly one component. Both zero and many
//! matches are configuration errors; nothing is picked on the caller's behalf.

use crate::error::{CoreError, Result};
use crate::installation::{Component, Installation};
use crate::kind::Category;

impl Installation {
    /// Resolve the single component with this alias whose kind is in `category`
    pub fn resolve(&self, alias: &str, category: Category) -> Result<&Component> {
        let mut matches = self
            .with_alias(alias)
            .filter(|c| category.contains(c.kind()));

        let Some(first) = matches.next() else {
            return Err(CoreError::NoMatchingComponent {
                alias: alias.to_string(),
                category,
            });
        };

        let extra = matches.count();
        if extra > 0 {
            return Err(CoreError::AmbiguousAlias {
                alias: alias.to_string(),
                category,
                count: extra + 1,
            });
        }

        Ok(first)
    }

    /// Resolve the single pod-like component with this alias
    pub fn pod_component(&self, alias: &str) -> Result<&Component> {
        self.resolve(alias, Category::Pod)
    }

    /// Resolve the single service component with this alias
    pub fn service_component(&self, alias: &str) -> Result<&Component> {
        self.resolve(alias, Category::Service)
    }

    /// Resolve the single job component with this alias
    pub fn job_component(&self, alias: &str) -> Result<&Component> {
        self.resolve(alias, Category::Job)
    }
}
