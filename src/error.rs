//! Error types for building and running playbooks
//!
//! Build errors are returned from the builder call that violates a contract,
//! never deferred until the play runs. Engine errors describe a failed
//! handoff to the external playbook runner.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Contract violations detected while assembling a playbook
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    /// Block or play name was empty
    #[error("block name cannot be empty")]
    EmptyName,

    /// Play name is not a bare `.yml` filename
    #[error("play name {name:?} must be a bare filename ending in .yml")]
    InvalidPlayName { name: String },

    /// A block handle did not resolve to a nested block
    #[error("nested block {name:?} not found")]
    UnknownBlock { name: String },

    /// A play was run or rendered without any top-level tasks
    #[error("play {name:?} has no tasks")]
    EmptyPlay { name: String },

    /// A required field was empty
    #[error("{task}: {field} cannot be empty")]
    MissingField {
        task: &'static str,
        field: &'static str,
    },

    /// Copy was given both a source file and inline content
    #[error("copy to {dest:?}: src and content are mutually exclusive")]
    SourceAndContent { dest: String },

    /// Copy was given neither a source file nor inline content
    #[error("copy to {dest:?}: one of src or content is required")]
    NoSourceOrContent { dest: String },

    /// A pass-through field used a key the builder sets itself
    #[error("field {key:?} is reserved and cannot be passed through")]
    ReservedField { key: String },

    /// A pass-through field value failed structural validation
    #[error("invalid value at {path}: {reason}")]
    InvalidValue { path: String, reason: String },
}

/// Failures reported by the external playbook runner
#[derive(Debug, Error)]
pub enum EngineError {
    /// The runner could not be started at all
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The runner exited with a non-zero status
    #[error("{program} failed on {document} ({status})")]
    Failed {
        program: String,
        document: PathBuf,
        status: ExitStatus,
    },
}

impl EngineError {
    /// Exit code of a failed run, if the process exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            EngineError::Failed { status, .. } => status.code(),
            EngineError::Spawn { .. } => None,
        }
    }
}
