//! Observable events for the partition layer
//!
//! Events are explicit and typed so log consumers can rely on stable names.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Request handling
    /// Partition approach selector missing or unknown
    ApproachRejected,
    /// No identity token could be resolved for the request
    IdentityMissing,
    /// An identity token was issued
    TokenIssued,

    // Credential exchange
    /// Scoped credentials were issued for a rendered policy
    CredentialsIssued,

    // Backend provisioning
    /// A bucket was created on first use
    BucketCreated,
    /// An access point was created on first use
    AccessPointCreated,
    /// An existence check failed with something other than "not found"
    ProvisionCheckFailed,

    // Object operations
    /// An object was written
    ObjectStored,
    /// Objects were listed for a tenant
    ObjectsListed,
    /// A metadata record was written alongside an object
    MetadataRecorded,
    /// A per-object tag read was denied and the object was excluded
    TagReadDenied,
    /// The backend reported a non-success status or empty result
    BackendUnavailable,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ApproachRejected => "APPROACH_REJECTED",
            Event::IdentityMissing => "IDENTITY_MISSING",
            Event::TokenIssued => "TOKEN_ISSUED",
            Event::CredentialsIssued => "CREDENTIALS_ISSUED",
            Event::BucketCreated => "BUCKET_CREATED",
            Event::AccessPointCreated => "ACCESS_POINT_CREATED",
            Event::ProvisionCheckFailed => "PROVISION_CHECK_FAILED",
            Event::ObjectStored => "OBJECT_STORED",
            Event::ObjectsListed => "OBJECTS_LISTED",
            Event::MetadataRecorded => "METADATA_RECORDED",
            Event::TagReadDenied => "TAG_READ_DENIED",
            Event::BackendUnavailable => "BACKEND_UNAVAILABLE",
        }
    }

    /// Default severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ApproachRejected
            | Event::IdentityMissing
            | Event::ProvisionCheckFailed
            | Event::TagReadDenied
            | Event::BackendUnavailable => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake_case() {
        let events = [
            Event::ApproachRejected,
            Event::IdentityMissing,
            Event::TokenIssued,
            Event::CredentialsIssued,
            Event::BucketCreated,
            Event::AccessPointCreated,
            Event::ProvisionCheckFailed,
            Event::ObjectStored,
            Event::ObjectsListed,
            Event::MetadataRecorded,
            Event::TagReadDenied,
            Event::BackendUnavailable,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_tag_read_denied_is_a_warning() {
        assert_eq!(Event::TagReadDenied.severity(), Severity::Warn);
        assert_eq!(Event::ObjectStored.severity(), Severity::Info);
    }
}
