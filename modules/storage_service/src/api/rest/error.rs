//! HTTP error mapping to RFC-9457 Problem Details

use super::dto::FieldErrorDto;
use crate::contract::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Per-field validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorDto>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            errors: Vec::new(),
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add instance URI
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldErrorDto>) -> Self {
        self.errors = errors;
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: StorageError) -> Problem {
    match error {
        StorageError::NotFound { resource, id } => {
            Problem::new(StatusCode::NOT_FOUND, format!("{} Not Found", resource))
                .with_detail(format!("{} with id '{}' was not found", resource, id))
                .with_instance(format!("/storages/{}", id))
        }

        StorageError::Validation { failures } => {
            Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
                .with_detail(format!("{} validation rule(s) failed", failures.len()))
                .with_errors(failures.into_iter().map(Into::into).collect())
        }

        StorageError::InvalidArgument { message } => {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Argument").with_detail(message)
        }

        StorageError::Internal => {
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .with_detail("An unexpected error occurred")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{FailureKind, ValidationFailure};

    #[test]
    fn test_validation_problem_lists_members() {
        let problem = map_domain_error(StorageError::Validation {
            failures: vec![
                ValidationFailure::new("code", FailureKind::DuplicateCode, "taken"),
                ValidationFailure::new("name", FailureKind::RequiredFieldMissing, "required"),
            ],
        });

        assert_eq!(problem.status, 400);
        let members: Vec<_> = problem.errors.iter().map(|e| e.member.as_str()).collect();
        assert_eq!(members, vec!["code", "name"]);
    }

    #[test]
    fn test_not_found_status() {
        let problem = map_domain_error(StorageError::not_found(7));
        assert_eq!(problem.status, 404);
        assert_eq!(problem.instance.as_deref(), Some("/storages/7"));
    }
}
