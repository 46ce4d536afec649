//! CLI error types with exit code handling
//!
//! Library errors are folded into one variant per failure class so each
//! maps to a single exit code.

use litmus_core::CoreError;
use litmus_kube::{Action, Condition, ErrorCategory, VerifyError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Descriptor or component shape problem
    #[error("Configuration error: {message}")]
    #[diagnostic(code(litmus::cli::configuration))]
    Configuration {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Resolution error: {message}")]
    #[diagnostic(
        code(litmus::cli::resolution),
        help("an alias must match exactly one component of the expected kind")
    )]
    Resolution { message: String },

    #[error("Indeterminate status: {message}")]
    #[diagnostic(code(litmus::cli::indeterminate))]
    Indeterminate { message: String },

    #[error("Command failed: {message}")]
    #[diagnostic(code(litmus::cli::command))]
    Command {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unsupported: {message}")]
    #[diagnostic(code(litmus::cli::unsupported))]
    Unsupported {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Internal error (unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(litmus::cli::internal))]
    Internal { message: String },

    /// The check was evaluated and did not hold
    #[error("{message}")]
    #[diagnostic(code(litmus::cli::verdict))]
    Verdict { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Configuration { .. } => exit_codes::CONFIGURATION_ERROR,
            CliError::Resolution { .. } => exit_codes::RESOLUTION_ERROR,
            CliError::Indeterminate { .. } => exit_codes::INDETERMINATE,
            CliError::Command { .. } => exit_codes::COMMAND_ERROR,
            CliError::Unsupported { .. } => exit_codes::UNSUPPORTED,
            CliError::Verdict { .. } => exit_codes::VERDICT_FALSE,
            CliError::Internal { .. } => exit_codes::INTERNAL_ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

impl From<VerifyError> for CliError {
    fn from(err: VerifyError) -> Self {
        let message = err.to_string();
        match err.category() {
            ErrorCategory::Configuration => CliError::Configuration {
                help: configuration_help(&err),
                message,
            },
            ErrorCategory::Resolution => CliError::Resolution { message },
            ErrorCategory::StatusIndeterminate => CliError::Indeterminate { message },
            ErrorCategory::Command => CliError::Command {
                help: matches!(err, VerifyError::CommandSpawn { .. })
                    .then(|| "set --kubectl or KUBECTL_PATH to the kubectl executable".to_string()),
                message,
            },
            ErrorCategory::Unsupported => CliError::Unsupported {
                help: unsupported_help(&err),
                message,
            },
            ErrorCategory::Verdict => CliError::Verdict { message },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        VerifyError::from(err).into()
    }
}

fn configuration_help(err: &VerifyError) -> Option<String> {
    match err {
        VerifyError::Core(CoreError::DescriptorNotProvided) => {
            Some("pass the installation descriptor with -f/--file".to_string())
        }
        VerifyError::MissingSelector { .. } => {
            Some("add `labels` to the component in the installation descriptor".to_string())
        }
        VerifyError::InsufficientSelector { .. } => {
            Some("set `name` or `labels` on the component".to_string())
        }
        _ => None,
    }
}

fn unsupported_help(err: &VerifyError) -> Option<String> {
    match err {
        VerifyError::UnsupportedCondition(_) => Some(format!(
            "supported conditions: {}",
            join(Condition::ALL.iter().filter(|c| **c != Condition::ThreeReplicas))
        )),
        VerifyError::UnsupportedAction(_) => {
            Some(format!("supported actions: {}", join(Action::ALL.iter())))
        }
        VerifyError::UnsupportedProperty(_) => Some("supported properties: service-ip".to_string()),
        _ => None,
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
