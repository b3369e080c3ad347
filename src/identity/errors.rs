//! # Identity Errors

use thiserror::Error;

/// Result type for identity token operations
pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token signature")]
    InvalidSignature,

    /// Header identity disagrees with the token claims
    #[error("Token does not match {0}")]
    ClaimMismatch(&'static str),

    /// Tenant or user id that is empty or contains a path separator
    #[error("Invalid identifier in {0}")]
    InvalidIdentifier(&'static str),

    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Failed to generate token")]
    TokenGenerationFailed,
}

impl IdentityError {
    pub fn status_code(&self) -> u16 {
        match self {
            IdentityError::MalformedToken
            | IdentityError::TokenExpired
            | IdentityError::InvalidSignature
            | IdentityError::ClaimMismatch(_) => 401,
            IdentityError::InvalidIdentifier(_) => 400,
            IdentityError::MissingSecret | IdentityError::TokenGenerationFailed => 500,
        }
    }
}
