//! # Metadata Index
//!
//! Per-object metadata records for the indexed-metadata strategy, keyed by
//! the `tenant_id^user_id` partition key with the stored key name as the
//! sort attribute.

use serde::{Deserialize, Serialize};

use super::broker::ScopedCredentials;
use super::errors::BackendResult;

/// One record per stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub partition_key: String,
    pub key_name: String,
    pub tenant_id: String,
    pub user_id: String,
    pub bucket_name: String,
    pub url: String,
    /// ISO-8601 timestamp
    pub last_modified: String,
    pub size: u64,
    pub etag: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutRecordOutput {
    pub status: u16,
    pub table: String,
    pub partition_key: String,
    pub key_name: String,
}

/// Metadata index operations
pub trait MetadataIndex: Send + Sync {
    /// Insert or replace the record addressed by (partition_key, key_name)
    fn put_record(
        &self,
        creds: &ScopedCredentials,
        table: &str,
        record: &MetadataRecord,
    ) -> BackendResult<PutRecordOutput>;

    /// Query a partition, projecting only the stored key names
    fn query_key_names(
        &self,
        creds: &ScopedCredentials,
        table: &str,
        partition_key: &str,
    ) -> BackendResult<Vec<String>>;
}
