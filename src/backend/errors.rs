//! # Backend Errors
//!
//! Failures reported by the storage, credential, or metadata collaborators.
//! The backend's own error code is preserved verbatim so it can be surfaced
//! to the caller.

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

pub const ACCESS_DENIED: &str = "AccessDenied";
pub const NOT_FOUND: &str = "404";
pub const NO_SUCH_BUCKET: &str = "NoSuchBucket";
pub const NO_SUCH_KEY: &str = "NoSuchKey";
pub const NO_SUCH_ACCESS_POINT: &str = "NoSuchAccessPoint";
pub const BUCKET_ALREADY_OWNED: &str = "BucketAlreadyOwnedByYou";
pub const ACCESS_POINT_ALREADY_OWNED: &str = "AccessPointAlreadyOwnedByYou";
pub const INVALID_ACCESS_KEY: &str = "InvalidAccessKeyId";
pub const SIGNATURE_MISMATCH: &str = "SignatureDoesNotMatch";
pub const EXPIRED_TOKEN: &str = "ExpiredToken";
pub const PACKED_POLICY_TOO_LARGE: &str = "PackedPolicyTooLarge";
pub const MALFORMED_POLICY: &str = "MalformedPolicyDocument";
pub const INTERNAL_ERROR: &str = "InternalError";

/// A structured failure reported by a backend collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct BackendError {
    /// Backend error code, e.g. `AccessDenied` or `NoSuchAccessPoint`
    pub code: String,
    /// Human readable detail
    pub message: String,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ACCESS_DENIED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    pub fn is_access_denied(&self) -> bool {
        self.code == ACCESS_DENIED
    }

    /// HEAD requests carry no body, so a missing bucket arrives as a bare `404`
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code.as_str(),
            NOT_FOUND | "NotFound" | NO_SUCH_BUCKET | NO_SUCH_KEY
        )
    }

    pub fn is_no_such_access_point(&self) -> bool {
        self.code == NO_SUCH_ACCESS_POINT
    }

    /// The resource already exists and belongs to the caller
    pub fn is_already_owned(&self) -> bool {
        matches!(
            self.code.as_str(),
            BUCKET_ALREADY_OWNED | ACCESS_POINT_ALREADY_OWNED
        )
    }
}
