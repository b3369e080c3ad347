//! # In-Memory Backend
//!
//! A single-process implementation of all three backend capabilities.
//! Credentials issued by its broker are checked on every storage and
//! metadata call. Faults can be injected per operation (and optionally per
//! target) so every failure path of the strategies can be exercised.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use serde_json::Value;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::broker::{AssumeRoleRequest, CredentialBroker, ScopedCredentials};
use super::errors::{
    BackendError, BackendResult, ACCESS_POINT_ALREADY_OWNED, BUCKET_ALREADY_OWNED,
    EXPIRED_TOKEN, INVALID_ACCESS_KEY, MALFORMED_POLICY, NOT_FOUND, NO_SUCH_ACCESS_POINT,
    NO_SUCH_BUCKET, NO_SUCH_KEY, PACKED_POLICY_TOO_LARGE, SIGNATURE_MISMATCH,
};
use super::metadata::{MetadataIndex, MetadataRecord, PutRecordOutput};
use super::store::{
    AccessPoint, ListObjectsOutput, ObjectHead, ObjectStore, ObjectSummary, PublicAccessBlock,
    PutObjectOutput, Tag, TaggingOutput,
};

/// Region in which buckets are created without a location constraint
pub const DEFAULT_REGION: &str = "us-east-1";

const MAX_POLICY_CHARS: usize = 2048;
const DEFAULT_SESSION_SECS: u32 = 3600;
const MIN_SESSION_SECS: u32 = 900;
const MAX_SESSION_SECS: u32 = 43_200;
const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";
/// Calls kept for inspection; older calls are dropped
pub const CALL_LOG_CAPACITY: usize = 1024;

/// A forced failure for one backend operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Operation name, e.g. `get_object_tagging`
    pub operation: String,
    /// Restrict the fault to one target (object key, bucket, access point
    /// name, role ARN or partition key depending on the operation)
    pub target: Option<String>,
    pub error: BackendError,
}

impl Fault {
    pub fn on(operation: impl Into<String>, error: BackendError) -> Self {
        Self {
            operation: operation.into(),
            target: None,
            error,
        }
    }

    pub fn for_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    fn matches(&self, operation: &str, target: &str) -> bool {
        self.operation == operation && self.target.as_deref().map_or(true, |t| t == target)
    }
}

/// A call observed by the backend, recorded before any checks run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCall {
    pub operation: String,
    pub target: String,
}

#[derive(Debug)]
struct Session {
    secret_access_key: String,
    session_token: String,
    policy: String,
    expiration: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    etag: String,
    content_type: String,
    last_modified: DateTime<Utc>,
    tags: Vec<Tag>,
}

#[derive(Debug, Default)]
struct StoredBucket {
    location: Option<String>,
    public_access_block: Option<PublicAccessBlock>,
    objects: BTreeMap<String, StoredObject>,
}

#[derive(Debug, Default)]
struct State {
    sessions: HashMap<String, Session>,
    buckets: BTreeMap<String, StoredBucket>,
    /// key: (account_id, name)
    access_points: BTreeMap<(String, String), AccessPoint>,
    /// key: table -> (partition_key, key_name)
    tables: HashMap<String, BTreeMap<(String, String), MetadataRecord>>,
    faults: Vec<Fault>,
    forced_put_status: Option<u16>,
    /// Most recent calls, oldest first, at most `CALL_LOG_CAPACITY`
    calls: VecDeque<BackendCall>,
    sessions_issued: usize,
}

impl State {
    fn bucket(&self, name: &str) -> BackendResult<&StoredBucket> {
        self.buckets
            .get(name)
            .ok_or_else(|| BackendError::new(NO_SUCH_BUCKET, format!("bucket {} does not exist", name)))
    }

    fn bucket_mut(&mut self, name: &str) -> BackendResult<&mut StoredBucket> {
        self.buckets
            .get_mut(name)
            .ok_or_else(|| BackendError::new(NO_SUCH_BUCKET, format!("bucket {} does not exist", name)))
    }

    fn object_mut(&mut self, bucket: &str, key: &str) -> BackendResult<&mut StoredObject> {
        self.bucket_mut(bucket)?
            .objects
            .get_mut(key)
            .ok_or_else(|| BackendError::new(NO_SUCH_KEY, format!("key {} does not exist", key)))
    }

    /// Resolve a bucket name or access point ARN to the bucket it addresses
    fn resolve_target(&self, target: &str) -> BackendResult<String> {
        if !target.starts_with("arn:") {
            return Ok(target.to_string());
        }
        self.access_points
            .values()
            .find(|ap| ap.arn == target)
            .map(|ap| ap.bucket.clone())
            .ok_or_else(|| {
                BackendError::new(NO_SUCH_ACCESS_POINT, format!("access point {} does not exist", target))
            })
    }

    fn authorize(&self, creds: &ScopedCredentials) -> BackendResult<()> {
        let session = self.sessions.get(&creds.access_key_id).ok_or_else(|| {
            BackendError::new(INVALID_ACCESS_KEY, "the access key id does not exist")
        })?;

        let secret_ok: bool = session
            .secret_access_key
            .as_bytes()
            .ct_eq(creds.secret_access_key().as_bytes())
            .into();
        let token_ok: bool = session
            .session_token
            .as_bytes()
            .ct_eq(creds.session_token().as_bytes())
            .into();
        if !(secret_ok && token_ok) {
            return Err(BackendError::new(SIGNATURE_MISMATCH, "credential material does not match"));
        }

        if Utc::now() >= session.expiration {
            return Err(BackendError::new(EXPIRED_TOKEN, "the session token has expired"));
        }
        Ok(())
    }
}

/// In-memory object store, credential broker and metadata index
#[derive(Debug)]
pub struct InMemoryBackend {
    region: String,
    state: RwLock<State>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

impl InMemoryBackend {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            state: RwLock::new(State::default()),
        }
    }

    /// Create a metadata table
    pub fn with_table(self, table: impl Into<String>) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.tables.entry(table.into()).or_default();
        }
        self
    }

    pub fn inject_fault(&self, fault: Fault) {
        if let Ok(mut state) = self.state.write() {
            state.faults.push(fault);
        }
    }

    /// Make every subsequent object write answer with `status` instead of 200.
    /// Writes answered with a non-200 status are not stored.
    pub fn force_put_status(&self, status: u16) {
        if let Ok(mut state) = self.state.write() {
            state.forced_put_status = Some(status);
        }
    }

    /// The most recent calls, oldest first
    pub fn calls(&self) -> Vec<BackendCall> {
        self.read()
            .map(|s| s.calls.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Credentials issued since the backend was created
    pub fn issued_sessions(&self) -> usize {
        self.read().map(|s| s.sessions_issued).unwrap_or_default()
    }

    /// Session policy attached to the credentials with `access_key_id`
    pub fn session_policy(&self, access_key_id: &str) -> Option<Value> {
        let state = self.read().ok()?;
        let session = state.sessions.get(access_key_id)?;
        serde_json::from_str(&session.policy).ok()
    }

    /// Policies of the sessions that have not expired, in no particular order
    pub fn session_policies(&self) -> Vec<Value> {
        self.read()
            .map(|s| {
                s.sessions
                    .values()
                    .filter_map(|session| serde_json::from_str(&session.policy).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.read().map(|s| s.buckets.contains_key(bucket)).unwrap_or(false)
    }

    pub fn public_access_block(&self, bucket: &str) -> Option<PublicAccessBlock> {
        self.read().ok()?.buckets.get(bucket)?.public_access_block
    }

    pub fn object_body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let state = self.read().ok()?;
        state.buckets.get(bucket)?.objects.get(key).map(|o| o.body.clone())
    }

    pub fn object_tags(&self, bucket: &str, key: &str) -> Option<Vec<Tag>> {
        let state = self.read().ok()?;
        state.buckets.get(bucket)?.objects.get(key).map(|o| o.tags.clone())
    }

    pub fn access_point_exists(&self, account_id: &str, name: &str) -> bool {
        self.read()
            .map(|s| s.access_points.contains_key(&(account_id.to_string(), name.to_string())))
            .unwrap_or(false)
    }

    pub fn metadata_record(&self, table: &str, partition_key: &str, key_name: &str) -> Option<MetadataRecord> {
        let state = self.read().ok()?;
        state
            .tables
            .get(table)?
            .get(&(partition_key.to_string(), key_name.to_string()))
            .cloned()
    }

    fn read(&self) -> BackendResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| BackendError::internal("lock poisoned"))
    }

    /// Record the call, apply injected faults, then check credentials
    fn begin(
        &self,
        operation: &str,
        target: &str,
        creds: Option<&ScopedCredentials>,
    ) -> BackendResult<RwLockWriteGuard<'_, State>> {
        let mut state = self
            .state
            .write()
            .map_err(|_| BackendError::internal("lock poisoned"))?;

        if state.calls.len() == CALL_LOG_CAPACITY {
            state.calls.pop_front();
        }
        state.calls.push_back(BackendCall {
            operation: operation.to_string(),
            target: target.to_string(),
        });

        if let Some(fault) = state.faults.iter().find(|f| f.matches(operation, target)) {
            return Err(fault.error.clone());
        }

        if let Some(creds) = creds {
            state.authorize(creds)?;
        }
        Ok(state)
    }

    fn access_point_arn(&self, account_id: &str, name: &str) -> String {
        format!("arn:aws:s3:{}:{}:accesspoint/{}", self.region, account_id, name)
    }
}

fn etag_for(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    let hex: String = digest.iter().take(16).map(|b| format!("{:02x}", b)).collect();
    format!("\"{}\"", hex)
}

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

impl CredentialBroker for InMemoryBackend {
    fn assume_role(&self, request: &AssumeRoleRequest) -> BackendResult<ScopedCredentials> {
        let mut state = self.begin("assume_role", &request.role_arn, None)?;

        if !request.role_arn.starts_with("arn:") {
            return Err(BackendError::new(
                "ValidationError",
                format!("invalid role ARN: {}", request.role_arn),
            ));
        }
        if request.session_name.is_empty() {
            return Err(BackendError::new("ValidationError", "role session name is empty"));
        }
        if request.policy.chars().count() > MAX_POLICY_CHARS {
            return Err(BackendError::new(
                PACKED_POLICY_TOO_LARGE,
                format!("session policy exceeds {} characters", MAX_POLICY_CHARS),
            ));
        }
        if serde_json::from_str::<Value>(&request.policy).is_err() {
            return Err(BackendError::new(MALFORMED_POLICY, "session policy is not valid JSON"));
        }

        let duration = request.duration_secs.unwrap_or(DEFAULT_SESSION_SECS);
        if !(MIN_SESSION_SECS..=MAX_SESSION_SECS).contains(&duration) {
            return Err(BackendError::new(
                "ValidationError",
                format!("duration {} outside {}..={}", duration, MIN_SESSION_SECS, MAX_SESSION_SECS),
            ));
        }

        let access_key_id = format!("ASIA{}", random_alphanumeric(16).to_uppercase());
        let secret_access_key = random_alphanumeric(40);
        let mut token_bytes = [0u8; 48];
        rand::thread_rng().fill_bytes(&mut token_bytes);
        let session_token = STANDARD.encode(token_bytes);
        let now = Utc::now();
        let expiration = now + Duration::seconds(i64::from(duration));

        state.sessions.retain(|_, session| session.expiration > now);
        state.sessions_issued += 1;
        state.sessions.insert(
            access_key_id.clone(),
            Session {
                secret_access_key: secret_access_key.clone(),
                session_token: session_token.clone(),
                policy: request.policy.clone(),
                expiration,
            },
        );

        Ok(ScopedCredentials::new(
            access_key_id,
            secret_access_key,
            session_token,
            expiration,
        ))
    }
}

impl ObjectStore for InMemoryBackend {
    fn head_bucket(&self, creds: &ScopedCredentials, bucket: &str) -> BackendResult<()> {
        let state = self.begin("head_bucket", bucket, Some(creds))?;
        if state.buckets.contains_key(bucket) {
            Ok(())
        } else {
            Err(BackendError::new(NOT_FOUND, "Not Found"))
        }
    }

    fn create_bucket(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        location: Option<&str>,
    ) -> BackendResult<()> {
        let mut state = self.begin("create_bucket", bucket, Some(creds))?;

        match (self.region.as_str(), location) {
            (DEFAULT_REGION, Some(loc)) => {
                return Err(BackendError::new(
                    "InvalidLocationConstraint",
                    format!("location constraint {} is not valid in {}", loc, DEFAULT_REGION),
                ));
            }
            (region, loc) if region != DEFAULT_REGION && loc != Some(region) => {
                return Err(BackendError::new(
                    "IllegalLocationConstraintException",
                    format!("bucket must be created with location constraint {}", region),
                ));
            }
            _ => {}
        }

        if state.buckets.contains_key(bucket) {
            return Err(BackendError::new(
                BUCKET_ALREADY_OWNED,
                format!("bucket {} already exists", bucket),
            ));
        }

        state.buckets.insert(
            bucket.to_string(),
            StoredBucket {
                location: location.map(str::to_string),
                ..StoredBucket::default()
            },
        );
        Ok(())
    }

    fn bucket_location(&self, creds: &ScopedCredentials, bucket: &str) -> BackendResult<Option<String>> {
        let state = self.begin("get_bucket_location", bucket, Some(creds))?;
        Ok(state.bucket(bucket)?.location.clone())
    }

    fn put_public_access_block(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        config: &PublicAccessBlock,
    ) -> BackendResult<()> {
        let mut state = self.begin("put_public_access_block", bucket, Some(creds))?;
        state.bucket_mut(bucket)?.public_access_block = Some(*config);
        Ok(())
    }

    fn put_object(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        key: &str,
        body: &[u8],
    ) -> BackendResult<PutObjectOutput> {
        let mut state = self.begin("put_object", key, Some(creds))?;
        let status = state.forced_put_status.unwrap_or(200);
        let etag = etag_for(body);

        let stored = state.bucket_mut(bucket)?;
        if status == 200 {
            stored.objects.insert(
                key.to_string(),
                StoredObject {
                    body: body.to_vec(),
                    etag: etag.clone(),
                    content_type: DEFAULT_CONTENT_TYPE.to_string(),
                    last_modified: Utc::now(),
                    tags: Vec::new(),
                },
            );
        }

        Ok(PutObjectOutput { status, etag })
    }

    fn get_object(&self, creds: &ScopedCredentials, bucket: &str, key: &str) -> BackendResult<Vec<u8>> {
        let mut state = self.begin("get_object", key, Some(creds))?;
        Ok(state.object_mut(bucket, key)?.body.clone())
    }

    fn head_object(&self, creds: &ScopedCredentials, bucket: &str, key: &str) -> BackendResult<ObjectHead> {
        let state = self.begin("head_object", key, Some(creds))?;
        let object = state
            .bucket(bucket)?
            .objects
            .get(key)
            .ok_or_else(|| BackendError::new(NOT_FOUND, "Not Found"))?;

        Ok(ObjectHead {
            content_length: object.body.len() as u64,
            content_type: object.content_type.clone(),
            etag: object.etag.clone(),
            last_modified: object.last_modified,
        })
    }

    fn list_objects(
        &self,
        creds: &ScopedCredentials,
        target: &str,
        prefix: &str,
    ) -> BackendResult<ListObjectsOutput> {
        let state = self.begin("list_objects", target, Some(creds))?;
        let bucket = state.resolve_target(target)?;

        let contents: Vec<ObjectSummary> = state
            .bucket(&bucket)?
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.body.len() as u64,
                etag: object.etag.clone(),
                last_modified: object.last_modified,
            })
            .collect();

        Ok(ListObjectsOutput {
            key_count: contents.len(),
            contents,
        })
    }

    fn put_object_tagging(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        key: &str,
        tags: &[Tag],
    ) -> BackendResult<TaggingOutput> {
        let mut state = self.begin("put_object_tagging", key, Some(creds))?;
        let object = state.object_mut(bucket, key)?;
        object.tags = tags.to_vec();

        Ok(TaggingOutput {
            status: 200,
            tags: object.tags.clone(),
        })
    }

    fn get_object_tagging(
        &self,
        creds: &ScopedCredentials,
        bucket: &str,
        key: &str,
    ) -> BackendResult<TaggingOutput> {
        let mut state = self.begin("get_object_tagging", key, Some(creds))?;
        let object = state.object_mut(bucket, key)?;

        Ok(TaggingOutput {
            status: 200,
            tags: object.tags.clone(),
        })
    }

    fn get_access_point(
        &self,
        creds: &ScopedCredentials,
        account_id: &str,
        name: &str,
    ) -> BackendResult<AccessPoint> {
        let state = self.begin("get_access_point", name, Some(creds))?;
        state
            .access_points
            .get(&(account_id.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| {
                BackendError::new(NO_SUCH_ACCESS_POINT, format!("access point {} does not exist", name))
            })
    }

    fn create_access_point(
        &self,
        creds: &ScopedCredentials,
        account_id: &str,
        name: &str,
        bucket: &str,
    ) -> BackendResult<AccessPoint> {
        let mut state = self.begin("create_access_point", name, Some(creds))?;
        state.bucket(bucket)?;

        let id = (account_id.to_string(), name.to_string());
        if state.access_points.contains_key(&id) {
            return Err(BackendError::new(
                ACCESS_POINT_ALREADY_OWNED,
                format!("access point {} already exists", name),
            ));
        }

        let access_point = AccessPoint {
            name: name.to_string(),
            bucket: bucket.to_string(),
            arn: self.access_point_arn(account_id, name),
        };
        state.access_points.insert(id, access_point.clone());
        Ok(access_point)
    }
}

impl MetadataIndex for InMemoryBackend {
    fn put_record(
        &self,
        creds: &ScopedCredentials,
        table: &str,
        record: &MetadataRecord,
    ) -> BackendResult<PutRecordOutput> {
        let mut state = self.begin("put_item", &record.partition_key, Some(creds))?;
        let rows = state.tables.get_mut(table).ok_or_else(|| {
            BackendError::new("ResourceNotFoundException", format!("table {} not found", table))
        })?;

        rows.insert(
            (record.partition_key.clone(), record.key_name.clone()),
            record.clone(),
        );

        Ok(PutRecordOutput {
            status: 200,
            table: table.to_string(),
            partition_key: record.partition_key.clone(),
            key_name: record.key_name.clone(),
        })
    }

    fn query_key_names(
        &self,
        creds: &ScopedCredentials,
        table: &str,
        partition_key: &str,
    ) -> BackendResult<Vec<String>> {
        let state = self.begin("query", partition_key, Some(creds))?;
        let rows = state.tables.get(table).ok_or_else(|| {
            BackendError::new("ResourceNotFoundException", format!("table {} not found", table))
        })?;

        Ok(rows
            .iter()
            .filter(|((pk, _), _)| pk == partition_key)
            .map(|((_, key_name), _)| key_name.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(backend: &InMemoryBackend) -> ScopedCredentials {
        backend
            .assume_role(&AssumeRoleRequest {
                role_arn: "arn:aws:iam::111122223333:role/partition-exec".to_string(),
                session_name: "test-session".to_string(),
                policy: r#"{"Version":"2012-10-17","Statement":[]}"#.to_string(),
                duration_secs: None,
            })
            .unwrap()
    }

    #[test]
    fn test_assume_role_issues_distinct_credentials() {
        let backend = InMemoryBackend::default();
        let a = issue(&backend);
        let b = issue(&backend);
        assert!(a.access_key_id.starts_with("ASIA"));
        assert_ne!(a.access_key_id, b.access_key_id);
        assert_eq!(backend.issued_sessions(), 2);
        assert!(backend.session_policy(&a.access_key_id).is_some());
    }

    #[test]
    fn test_expired_sessions_pruned_on_issue() {
        let backend = InMemoryBackend::default();
        let stale = issue(&backend);
        if let Ok(mut state) = backend.state.write() {
            if let Some(session) = state.sessions.get_mut(&stale.access_key_id) {
                session.expiration = Utc::now() - Duration::seconds(1);
            }
        }

        let fresh = issue(&backend);
        assert!(backend.session_policy(&stale.access_key_id).is_none());
        assert!(backend.session_policy(&fresh.access_key_id).is_some());
        assert_eq!(backend.session_policies().len(), 1);
        assert_eq!(backend.issued_sessions(), 2);
    }

    #[test]
    fn test_call_log_is_bounded() {
        let backend = InMemoryBackend::default();
        let request = AssumeRoleRequest {
            role_arn: "not-an-arn".to_string(),
            session_name: "s".to_string(),
            policy: "{}".to_string(),
            duration_secs: None,
        };
        for _ in 0..CALL_LOG_CAPACITY + 10 {
            assert!(backend.assume_role(&request).is_err());
        }
        issue(&backend);

        let calls = backend.calls();
        assert_eq!(calls.len(), CALL_LOG_CAPACITY);
        assert_eq!(
            calls.last().map(|c| c.target.as_str()),
            Some("arn:aws:iam::111122223333:role/partition-exec")
        );
    }

    #[test]
    fn test_oversized_policy_rejected() {
        let backend = InMemoryBackend::default();
        let err = backend
            .assume_role(&AssumeRoleRequest {
                role_arn: "arn:aws:iam::1:role/r".to_string(),
                session_name: "s".to_string(),
                policy: format!("\"{}\"", "x".repeat(MAX_POLICY_CHARS)),
                duration_secs: None,
            })
            .unwrap_err();
        assert_eq!(err.code, PACKED_POLICY_TOO_LARGE);
    }

    #[test]
    fn test_unknown_credentials_rejected() {
        let backend = InMemoryBackend::default();
        let forged = ScopedCredentials::new("ASIAFORGED", "x", "y", Utc::now() + Duration::hours(1));
        let err = backend.head_bucket(&forged, "any").unwrap_err();
        assert_eq!(err.code, INVALID_ACCESS_KEY);
    }

    #[test]
    fn test_tampered_secret_rejected() {
        let backend = InMemoryBackend::default();
        let creds = issue(&backend);
        let tampered = ScopedCredentials::new(
            creds.access_key_id.clone(),
            "not-the-secret",
            creds.session_token(),
            creds.expiration,
        );
        let err = backend.head_bucket(&tampered, "any").unwrap_err();
        assert_eq!(err.code, SIGNATURE_MISMATCH);
    }

    #[test]
    fn test_bucket_lifecycle_and_listing() {
        let backend = InMemoryBackend::default();
        let creds = issue(&backend);

        assert!(backend.head_bucket(&creds, "b").unwrap_err().is_not_found());
        backend.create_bucket(&creds, "b", None).unwrap();
        assert!(backend.create_bucket(&creds, "b", None).unwrap_err().is_already_owned());

        backend.put_object(&creds, "b", "t1/u1/a.txt", b"a").unwrap();
        backend.put_object(&creds, "b", "t1/u2/b.txt", b"b").unwrap();

        let listed = backend.list_objects(&creds, "b", "t1/u1").unwrap();
        assert_eq!(listed.key_count, 1);
        assert_eq!(listed.contents[0].key, "t1/u1/a.txt");
        assert_eq!(backend.get_object(&creds, "b", "t1/u1/a.txt").unwrap(), b"a");
    }

    #[test]
    fn test_region_aware_bucket_creation() {
        let backend = InMemoryBackend::new("eu-west-1");
        let creds = issue(&backend);

        let err = backend.create_bucket(&creds, "b", None).unwrap_err();
        assert_eq!(err.code, "IllegalLocationConstraintException");

        backend.create_bucket(&creds, "b", Some("eu-west-1")).unwrap();
        assert_eq!(
            backend.bucket_location(&creds, "b").unwrap().as_deref(),
            Some("eu-west-1")
        );
    }

    #[test]
    fn test_list_through_access_point_arn() {
        let backend = InMemoryBackend::default();
        let creds = issue(&backend);
        backend.create_bucket(&creds, "b", None).unwrap();
        let ap = backend.create_access_point(&creds, "111122223333", "tenant1", "b").unwrap();
        backend.put_object(&creds, "b", "tenant1/u1/f.txt", b"x").unwrap();

        let listed = backend.list_objects(&creds, &ap.arn, "tenant1/u1").unwrap();
        assert_eq!(listed.key_count, 1);

        let missing = "arn:aws:s3:us-east-1:111122223333:accesspoint/ghost";
        assert!(backend
            .list_objects(&creds, missing, "")
            .unwrap_err()
            .is_no_such_access_point());
    }

    #[test]
    fn test_fault_targets_single_key() {
        let backend = InMemoryBackend::default();
        let creds = issue(&backend);
        backend.create_bucket(&creds, "b", None).unwrap();
        backend.put_object(&creds, "b", "k1", b"1").unwrap();
        backend.put_object(&creds, "b", "k2", b"2").unwrap();
        backend.inject_fault(
            Fault::on("get_object_tagging", BackendError::access_denied("denied")).for_target("k1"),
        );

        assert!(backend.get_object_tagging(&creds, "b", "k1").unwrap_err().is_access_denied());
        assert!(backend.get_object_tagging(&creds, "b", "k2").is_ok());
    }

    #[test]
    fn test_forced_put_status_skips_store() {
        let backend = InMemoryBackend::default();
        let creds = issue(&backend);
        backend.create_bucket(&creds, "b", None).unwrap();
        backend.force_put_status(500);

        let out = backend.put_object(&creds, "b", "k", b"v").unwrap();
        assert_eq!(out.status, 500);
        assert!(backend.object_body("b", "k").is_none());
    }

    #[test]
    fn test_metadata_query_projects_partition() {
        let backend = InMemoryBackend::default().with_table("objects");
        let creds = issue(&backend);
        for (pk, key) in [("t1^u1", "t1/u1/a"), ("t1^u1", "t1/u1/b"), ("t2^u1", "t2/u1/c")] {
            backend
                .put_record(
                    &creds,
                    "objects",
                    &MetadataRecord {
                        partition_key: pk.to_string(),
                        key_name: key.to_string(),
                        tenant_id: String::new(),
                        user_id: String::new(),
                        bucket_name: String::new(),
                        url: String::new(),
                        last_modified: String::new(),
                        size: 0,
                        etag: String::new(),
                        content_type: String::new(),
                    },
                )
                .unwrap();
        }

        let keys = backend.query_key_names(&creds, "objects", "t1^u1").unwrap();
        assert_eq!(keys, vec!["t1/u1/a".to_string(), "t1/u1/b".to_string()]);
    }
}
