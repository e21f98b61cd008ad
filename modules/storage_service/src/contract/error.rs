//! Contract error types for storage service
//!
//! These errors are transport-agnostic and used for inter-module communication.

use std::fmt;

/// Kind of a single validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A required field or nested reference is empty
    RequiredFieldMissing,
    /// Another active storage already uses the code
    DuplicateCode,
    /// The same module appears twice in one link collection
    DuplicateModule,
}

/// One failed validation rule, addressed by member path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Field or nested item path, e.g. `code` or `module_sources[1].module`
    pub member: String,
    pub kind: FailureKind,
    /// Human-readable message
    pub message: String,
}

impl ValidationFailure {
    pub fn new(member: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.member, self.message)
    }
}

/// Storage service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Storage not found (or soft-deleted)
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// One or more validation rules failed; nothing was written
    #[error("Validation failed: {}", join_failures(.failures))]
    Validation { failures: Vec<ValidationFailure> },
    /// Bad paging parameters, malformed filter or id mismatch
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
    /// Persistence failure
    #[error("Internal error")]
    Internal,
}

impl StorageError {
    pub fn not_found(id: i64) -> Self {
        Self::NotFound {
            resource: "storage".to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether this is a validation error containing a failure of `kind`
    pub fn has_failure(&self, kind: FailureKind) -> bool {
        match self {
            Self::Validation { failures } => failures.iter().any(|f| f.kind == kind),
            _ => false,
        }
    }
}

fn join_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
