//! # Identity Tokens
//!
//! HS256 JSON Web Tokens binding a tenant and user. A token is issued for a
//! `(tenant_id, user_id)` pair and later resolved back into a verified
//! `TenantContext`.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{IdentityError, IdentityResult};
use super::{check_identity, IdentityLookup};
use crate::config::TokenConfig;
use crate::context::TenantContext;
use crate::request::{RawRequest, X_TENANT_ID, X_TOKEN, X_USER_ID};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub tenant_id: String,
    pub user_id: String,
    /// Issued at (Unix epoch seconds)
    pub iat: i64,
    /// Expiration (Unix epoch seconds)
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    /// Token id
    pub jti: String,
}

/// Issues and validates identity tokens
#[derive(Clone)]
pub struct TokenManager {
    ttl: Duration,
    issuer: String,
    audience: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenManager {
    pub fn new(config: &TokenConfig) -> IdentityResult<Self> {
        if config.secret.is_empty() {
            return Err(IdentityError::MissingSecret);
        }
        let ttl = i64::try_from(config.ttl_secs)
            .map(Duration::seconds)
            .map_err(|_| IdentityError::TokenGenerationFailed)?;

        Ok(Self {
            ttl,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    pub fn issue(&self, tenant_id: &str, user_id: &str) -> IdentityResult<String> {
        check_identity(tenant_id, user_id)?;
        let now = Utc::now();
        let claims = TokenClaims {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| IdentityError::TokenGenerationFailed)
    }

    pub fn validate(&self, token: &str) -> IdentityResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
                ErrorKind::InvalidSignature => IdentityError::InvalidSignature,
                _ => IdentityError::MalformedToken,
            }
        })?;

        check_identity(&data.claims.tenant_id, &data.claims.user_id)?;
        Ok(data.claims)
    }

    /// Validate the `x-token` header. Identity headers sent alongside the
    /// token must agree with its claims.
    pub fn verify_request(&self, request: &RawRequest) -> IdentityResult<TenantContext> {
        let token = request.header(X_TOKEN).ok_or(IdentityError::MalformedToken)?;
        let claims = self.validate(token)?;

        if let Some(tenant) = request.header(X_TENANT_ID) {
            if tenant != claims.tenant_id {
                return Err(IdentityError::ClaimMismatch(X_TENANT_ID));
            }
        }
        if let Some(user) = request.header(X_USER_ID) {
            if user != claims.user_id {
                return Err(IdentityError::ClaimMismatch(X_USER_ID));
            }
        }

        Ok(TenantContext::new(claims.tenant_id, claims.user_id, token))
    }
}

impl IdentityLookup for TokenManager {
    fn resolve(&self, request: &RawRequest) -> Option<TenantContext> {
        self.verify_request(request).ok()
    }

    fn issue(&self, tenant_id: &str, user_id: &str) -> IdentityResult<String> {
        TokenManager::issue(self, tenant_id, user_id)
    }
}
