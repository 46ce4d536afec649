//! Litmus Kube - Kubernetes verification for installations
//!
//! This crate provides:
//! - **Runners**: Execute kubectl commands, or scripted responses in tests
//! - **Parsing**: Turn jsonpath output into readiness, nodes and phases
//! - **Installation Verifier**: Deployed, running and deleted checks over every component
//! - **Conditions**: Node placement, pvc binding and job completion checks per alias
//! - **Actions**: Pod deletion and node cordoning for resiliency scenarios
//! - **Fetcher**: Read properties such as a service IP off a component
//! - **Cluster Verifier**: Connectivity, multi-node check and manifest housekeeping

pub mod actions;
pub mod cluster;
pub mod conditions;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod queries;
pub mod runner;
pub mod verify;

pub use actions::Action;
pub use cluster::ClusterVerifier;
pub use conditions::Condition;
pub use error::{ErrorCategory, NOT_FOUND_MARKER, Result, VerifyError};
pub use fetch::{Fetcher, Property, ResourceFetcher};
pub use parse::Readiness;
pub use runner::{
    DEFAULT_KUBECTL_PATH, DEFAULT_NAMESPACE, KubeRunner, Kubectl, KubectlConfig, MockKubeRunner,
    RecordedCall,
};
pub use verify::{
    ActionVerifier, AllVerifier, ConditionVerifier, ConnectVerifier, DeleteVerifier,
    DeployRunVerifier, DeployVerifier, InstallVerifier, RunVerifier,
};
