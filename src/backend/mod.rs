//! # Backend Capabilities
//!
//! The external collaborators the partition layer depends on, expressed as
//! traits:
//! - `ObjectStore`: buckets, objects, tags and access points
//! - `CredentialBroker`: role assumption with an inline session policy
//! - `MetadataIndex`: per-object metadata records
//!
//! `InMemoryBackend` implements all three in a single process.

pub mod broker;
pub mod errors;
pub mod memory;
pub mod metadata;
pub mod store;

use std::sync::Arc;

pub use broker::{AssumeRoleRequest, CredentialBroker, ScopedCredentials};
pub use errors::{BackendError, BackendResult};
pub use memory::{BackendCall, Fault, InMemoryBackend};
pub use metadata::{MetadataIndex, MetadataRecord, PutRecordOutput};
pub use store::{
    AccessPoint, ListObjectsOutput, ObjectHead, ObjectStore, ObjectSummary, PublicAccessBlock,
    PutObjectOutput, Tag, TaggingOutput,
};

/// Handles to the three backend capabilities
#[derive(Clone)]
pub struct BackendServices {
    pub objects: Arc<dyn ObjectStore>,
    pub broker: Arc<dyn CredentialBroker>,
    pub metadata: Arc<dyn MetadataIndex>,
}

impl BackendServices {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        broker: Arc<dyn CredentialBroker>,
        metadata: Arc<dyn MetadataIndex>,
    ) -> Self {
        Self {
            objects,
            broker,
            metadata,
        }
    }

    /// Serve every capability from one in-memory backend
    pub fn in_memory(backend: Arc<InMemoryBackend>) -> Self {
        Self {
            objects: backend.clone(),
            broker: backend.clone(),
            metadata: backend,
        }
    }
}
