//! # Credential Broker
//!
//! Exchanges a rendered session policy for short-lived credentials scoped
//! to that policy. Credentials are issued per request and never cached.

use std::fmt;

use chrono::{DateTime, Utc};

use super::errors::BackendResult;

/// Role assumption request carrying an inline session policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    /// Serialized policy document
    pub policy: String,
    pub duration_secs: Option<u32>,
}

/// Short-lived, policy-restricted credentials
#[derive(Clone, PartialEq, Eq)]
pub struct ScopedCredentials {
    pub access_key_id: String,
    secret_access_key: String,
    session_token: String,
    pub expiration: DateTime<Utc>,
}

impl ScopedCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
            expiration,
        }
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiration
    }
}

impl fmt::Debug for ScopedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Issues scoped credentials by assuming a role with an inline policy
pub trait CredentialBroker: Send + Sync {
    fn assume_role(&self, request: &AssumeRoleRequest) -> BackendResult<ScopedCredentials>;
}
