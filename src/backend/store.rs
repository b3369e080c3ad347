//! # Object Store Capability
//!
//! The storage operations the isolation strategies depend on. Every call is
//! made under the scoped credentials issued for the current request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::broker::ScopedCredentials;
use super::errors::BackendResult;

/// An object tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Public access block configuration applied to new buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicAccessBlock {
    pub block_public_acls: bool,
    pub ignore_public_acls: bool,
    pub block_public_policy: bool,
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlock {
    /// Disallow every form of public ACL and policy
    pub fn locked_down() -> Self {
        Self {
            block_public_acls: true,
            ignore_public_acls: true,
            block_public_policy: true,
            restrict_public_buckets: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutObjectOutput {
    /// HTTP status the backend answered the write with
    pub status: u16,
    #[serde(rename = "ETag")]
    pub etag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectHead {
    pub content_length: u64,
    pub content_type: String,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ListObjectsOutput {
    pub key_count: usize,
    pub contents: Vec<ObjectSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggingOutput {
    pub status: u16,
    #[serde(rename = "TagSet")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPoint {
    pub name: String,
    pub bucket: String,
    pub arn: String,
}

/// Object storage operations
pub trait ObjectStore: Send + Sync {
    /// Succeeds if the bucket exists and is reachable; a missing bucket is
    /// reported with code `404`
    fn head_bucket(&self, creds: &ScopedCredentials, bucket: &str) -> BackendResult<()>;

    /// Create a bucket, with a location constraint outside the default region
    fn create_bucket(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        location: Option<&str>,
    ) -> BackendResult<()>;

    fn bucket_location(&self, creds: &ScopedCredentials, bucket: &str) -> BackendResult<Option<String>>;

    fn put_public_access_block(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        config: &PublicAccessBlock,
    ) -> BackendResult<()>;

    fn put_object(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        key: &str,
        body: &[u8],
    ) -> BackendResult<PutObjectOutput>;

    fn get_object(&self, creds: &ScopedCredentials, bucket: &str, key: &str) -> BackendResult<Vec<u8>>;

    fn head_object(&self, creds: &ScopedCredentials, bucket: &str, key: &str) -> BackendResult<ObjectHead>;

    /// List objects under `prefix`. `target` is a bucket name or an access
    /// point ARN.
    fn list_objects(
        &self,
        creds: &ScopedCredentials,
        target: &str,
        prefix: &str,
    ) -> BackendResult<ListObjectsOutput>;

    fn put_object_tagging(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        key: &str,
        tags: &[Tag],
    ) -> BackendResult<TaggingOutput>;

    fn get_object_tagging(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        key: &str,
    ) -> BackendResult<TaggingOutput>;

    fn get_access_point(
        &self,
        creds: &ScopedCredentials,
        account_id: &str,
        name: &str,
    ) -> BackendResult<AccessPoint>;

    fn create_access_point(
        &self,
        creds: &ScopedCredentials,
        account_id: &str,
        name: &str,
        bucket: &str,
    ) -> BackendResult<AccessPoint>;
}
