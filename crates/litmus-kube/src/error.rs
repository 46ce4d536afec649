//! Error types for litmus-kube

use litmus_core::CoreError;
use thiserror::Error;

use crate::conditions::Condition;

/// Result type for litmus-kube operations
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Marker kubectl prints when the requested object does not exist
pub const NOT_FOUND_MARKER: &str = "(NotFound)";

/// Errors that can occur while verifying an installation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// Descriptor loading or alias resolution failed
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("component kind is missing: {component}")]
    MissingKind { component: String },

    #[error("component name is required for {operation}: {component}")]
    MissingName {
        operation: &'static str,
        component: String,
    },

    /// Pod lookups go through label selectors
    #[error("component labels are required for {operation}: {kind} '{alias}'")]
    MissingSelector {
        operation: &'static str,
        kind: String,
        alias: String,
    },

    #[error("either component name or its labels is required: {component}")]
    InsufficientSelector { component: String },

    #[error("component '{alias}' is not a pvc resource (kind '{kind}')")]
    NotAPvc { alias: String, kind: String },

    /// Command output did not contain any expected token
    #[error("status of {subject} could not be determined: received output {output:?}")]
    StatusIndeterminate { subject: String, output: Vec<String> },

    #[error("{subject} is not running: readiness {readiness:?}")]
    NotRunning {
        subject: String,
        readiness: Vec<String>,
    },

    #[error("unable to determine nodes of components with alias '{alias}'")]
    NoNodesDetermined { alias: String },

    #[error("no running pod found for alias '{alias}'")]
    NoRunningPod { alias: String },

    #[error("node not found for pod '{pod}'")]
    NodeNotFound { pod: String },

    #[error("job pods are not completed: phases {phases:?}")]
    JobNotCompleted { phases: Vec<String> },

    #[error("pvc '{alias}' is bound to volume '{volume}'")]
    PvcBound { alias: String, volume: String },

    #[error("pvc '{alias}' is not bound")]
    PvcNotBound { alias: String },

    #[error("component is not deleted: {component}: output '{output}'")]
    NotDeleted { component: String, output: String },

    #[error("unable to verify delete status of component {component}: {output}")]
    DeleteStatusUnknown { component: String, output: String },

    #[error("service ip is not set for component '{alias}'")]
    ServiceIpNotSet { alias: String },

    /// The command ran and exited unsuccessfully
    #[error("command '{command}' failed: {stderr}")]
    Command { command: String, stderr: String },

    /// The command could not be started at all
    #[error("failed to run '{program}': {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("condition '{0}' is not supported")]
    UnsupportedCondition(String),

    #[error("action '{0}' is not supported")]
    UnsupportedAction(String),

    #[error("property '{0}' is not supported")]
    UnsupportedProperty(String),

    #[error("condition '{0}' is not implemented")]
    NotImplemented(Condition),
}

/// Broad classes of verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or missing descriptor, missing selector, wrong component shape
    Configuration,
    /// Alias matched zero or several components
    Resolution,
    /// Cluster output lacked the tokens needed to decide
    StatusIndeterminate,
    /// The underlying command failed
    Command,
    /// Unknown or unimplemented condition, action or property
    Unsupported,
    /// The cluster was inspected and the check did not hold
    Verdict,
}

impl VerifyError {
    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            VerifyError::Core(e) if e.is_resolution() => ErrorCategory::Resolution,
            VerifyError::Core(_)
            | VerifyError::MissingKind { .. }
            | VerifyError::MissingName { .. }
            | VerifyError::MissingSelector { .. }
            | VerifyError::InsufficientSelector { .. }
            | VerifyError::NotAPvc { .. } => ErrorCategory::Configuration,
            VerifyError::StatusIndeterminate { .. }
            | VerifyError::DeleteStatusUnknown { .. }
            | VerifyError::NoNodesDetermined { .. } => ErrorCategory::StatusIndeterminate,
            VerifyError::Command { .. } | VerifyError::CommandSpawn { .. } => {
                ErrorCategory::Command
            }
            VerifyError::UnsupportedCondition(_)
            | VerifyError::UnsupportedAction(_)
            | VerifyError::UnsupportedProperty(_)
            | VerifyError::NotImplemented(_) => ErrorCategory::Unsupported,
            VerifyError::NotRunning { .. }
            | VerifyError::NoRunningPod { .. }
            | VerifyError::NodeNotFound { .. }
            | VerifyError::JobNotCompleted { .. }
            | VerifyError::PvcBound { .. }
            | VerifyError::PvcNotBound { .. }
            | VerifyError::NotDeleted { .. }
            | VerifyError::ServiceIpNotSet { .. } => ErrorCategory::Verdict,
        }
    }

    /// Check if this is a command failure caused by a missing object
    pub fn is_not_found(&self) -> bool {
        matches!(self, VerifyError::Command { stderr, .. } if stderr.contains(NOT_FOUND_MARKER))
    }
}
