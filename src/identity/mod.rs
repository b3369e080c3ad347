//! # Identity
//!
//! Turns the opaque `x-token` header into a verified tenant context, and
//! issues tokens for a tenant/user pair.

pub mod errors;
pub mod token;

pub use errors::{IdentityError, IdentityResult};
pub use token::{TokenClaims, TokenManager};

use crate::context::TenantContext;
use crate::request::{RawRequest, X_TENANT_ID, X_USER_ID};

/// Characters that join tenant and user ids into storage prefixes and
/// partition keys
pub const RESERVED_SEPARATORS: [char; 2] = ['/', '^'];

/// Reject an id that is empty or would change the shape of a derived
/// prefix or partition key. `field` names the header the id came from.
pub fn check_identifier(field: &'static str, value: &str) -> IdentityResult<()> {
    if value.is_empty() || value.contains(RESERVED_SEPARATORS) {
        return Err(IdentityError::InvalidIdentifier(field));
    }
    Ok(())
}

/// Check both halves of a tenant/user pair
pub fn check_identity(tenant_id: &str, user_id: &str) -> IdentityResult<()> {
    check_identifier(X_TENANT_ID, tenant_id)?;
    check_identifier(X_USER_ID, user_id)
}

/// Identity lookup collaborator
pub trait IdentityLookup: Send + Sync {
    /// Verified identity for the request, or `None` when no token resolves
    fn resolve(&self, request: &RawRequest) -> Option<TenantContext>;

    fn issue(&self, tenant_id: &str, user_id: &str) -> IdentityResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifiers_accepted() {
        assert!(check_identity("acme", "user-1").is_ok());
        assert!(check_identity("Tenant_A.eu", "u1@example.com").is_ok());
    }

    #[test]
    fn test_separators_rejected() {
        assert_eq!(
            check_identity("acme/b", "c"),
            Err(IdentityError::InvalidIdentifier("x-tenant-id"))
        );
        assert_eq!(
            check_identity("acme", "b^c"),
            Err(IdentityError::InvalidIdentifier("x-user-id"))
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            check_identity("", "u1"),
            Err(IdentityError::InvalidIdentifier("x-tenant-id"))
        );
        assert_eq!(
            check_identity("t1", ""),
            Err(IdentityError::InvalidIdentifier("x-user-id"))
        );
    }
}
