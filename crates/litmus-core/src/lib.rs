//! Litmus Core - Core types for installation verification
//!
//! This crate provides the foundational types used throughout litmus:
//! - `Installation`: The declared set of components (loaded from YAML)
//! - `Component`: One declared Kubernetes resource with its alias
//! - `Category`: Kind families (pod-like, service-like, job-like)
//! - Alias resolution with strict one-match semantics

pub mod error;
pub mod installation;
pub mod kind;
pub mod resolver;

pub use error::{CoreError, Result};
pub use installation::{Component, Installation};
pub use kind::{Category, is_job, is_pod, is_pvc, is_service};
