//! # Partition Errors
//!
//! Crate-level failure taxonomy. Every variant maps to the HTTP status the
//! dispatcher answers with.

use std::error::Error as StdError;

use thiserror::Error;

use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::identity::IdentityError;
use crate::policy::PolicyError;

/// Result type for partition operations
pub type PartitionResult<T> = Result<T, PartitionError>;

/// Message returned when the backend answers without the expected data
pub const RETRY_MESSAGE: &str = "Operation failed. Please retry.";

#[derive(Debug, Error)]
pub enum PartitionError {
    // Validation
    #[error("Invalid input for partition approach")]
    InvalidApproach,

    #[error("Object key is required")]
    MissingObject,

    #[error("Malformed request body")]
    MalformedBody(#[source] serde_json::Error),

    // Identity
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    // Backend
    #[error("{}", RETRY_MESSAGE)]
    Unavailable,

    #[error("Backend request failed")]
    Backend(#[from] BackendError),

    // Internal
    #[error("Policy rendering failed")]
    Policy(#[from] PolicyError),

    #[error("Identity token failure")]
    Identity(#[from] IdentityError),

    #[error("Configuration error")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PartitionError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            PartitionError::InvalidApproach
            | PartitionError::MissingObject
            | PartitionError::MalformedBody(_) => 400,
            PartitionError::MissingFields(_) => 401,
            PartitionError::Unavailable => 503,
            PartitionError::Policy(e) => e.status_code(),
            PartitionError::Identity(e) => e.status_code(),
            PartitionError::Backend(_) | PartitionError::Config(_) | PartitionError::Internal(_) => {
                500
            }
        }
    }

    /// The backend's own error code, when the failure came from the backend
    pub fn backend_code(&self) -> Option<&str> {
        match self {
            PartitionError::Backend(e) => Some(e.code.as_str()),
            _ => None,
        }
    }
}

/// Render an error and each of its causes, outermost first, one per line
pub fn format_error_chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PartitionError::InvalidApproach.status_code(), 400);
        assert_eq!(PartitionError::MissingObject.status_code(), 400);
        assert_eq!(
            PartitionError::MissingFields(vec!["x-token".to_string()]).status_code(),
            401
        );
        assert_eq!(PartitionError::Unavailable.status_code(), 503);
        assert_eq!(
            PartitionError::Backend(BackendError::access_denied("x")).status_code(),
            500
        );
        assert_eq!(PartitionError::internal("boom").status_code(), 500);
    }

    #[test]
    fn test_subsystem_status_codes_pass_through() {
        assert_eq!(
            PartitionError::from(IdentityError::InvalidIdentifier("x-tenant-id")).status_code(),
            400
        );
        assert_eq!(PartitionError::from(IdentityError::MissingSecret).status_code(), 500);
        assert_eq!(
            PartitionError::from(PolicyError::MalformedPlaceholder("{".to_string())).status_code(),
            500
        );
    }

    #[test]
    fn test_error_chain_includes_backend_cause() {
        let err = PartitionError::from(BackendError::new("NoSuchAccessPoint", "gone"));
        let lines = format_error_chain(&err);
        assert_eq!(lines[0], "Backend request failed");
        assert_eq!(lines[1], "caused by: NoSuchAccessPoint: gone");
        assert_eq!(err.backend_code(), Some("NoSuchAccessPoint"));
    }

    #[test]
    fn test_policy_cause_is_named() {
        let err = PartitionError::from(PolicyError::MissingPlaceholder("prefix".to_string()));
        let lines = format_error_chain(&err);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("prefix"));
    }
}
