//! # Request Context
//!
//! Context is built in two steps. The base context holds the verified
//! tenant identity and the decoded object payload. A partition approach
//! then adds its resource identifiers (bucket, prefix, access point,
//! partition key) to produce a `RequestContext`. Contexts live for one
//! request and are never persisted.

use std::fmt;

use serde::de::Error as _;
use serde_json::Value;

use crate::errors::{PartitionError, PartitionResult};
use crate::identity::{check_identity, IdentityLookup};
use crate::policy::Placeholders;
use crate::request::{RawRequest, X_TOKEN};

/// Verified identity of the caller
#[derive(Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: String,
    pub user_id: String,
    token: String,
}

impl TenantContext {
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for TenantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantContext")
            .field("tenant_id", &self.tenant_id)
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Object key and value carried in the request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPayload {
    pub key: String,
    pub value: String,
}

impl ObjectPayload {
    /// Decode `{"key": ..., "value": ...}`. Bodies written with single
    /// quotes are accepted. Absent fields decode as empty strings.
    pub fn from_body(body: &str) -> PartitionResult<Self> {
        let parsed = serde_json::from_str::<Value>(body)
            .or_else(|_| serde_json::from_str::<Value>(&body.replace('\'', "\"")))
            .map_err(PartitionError::MalformedBody)?;

        let Value::Object(fields) = parsed else {
            return Err(PartitionError::MalformedBody(serde_json::Error::custom(
                "request body must be a JSON object",
            )));
        };

        let text = |name: &str| match fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Ok(Self {
            key: text("key"),
            value: text("value"),
        })
    }

    /// Object key, required for writes
    pub fn require_key(&self) -> PartitionResult<&str> {
        if self.key.is_empty() {
            Err(PartitionError::MissingObject)
        } else {
            Ok(&self.key)
        }
    }
}

/// Identity and payload, before any approach-specific derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseContext {
    pub tenant: TenantContext,
    pub object: ObjectPayload,
}

/// Resolve the caller's identity and decode the body.
///
/// An unresolvable token yields `MissingFields(["x-token"])` before the
/// body is looked at. Ids that would not stay inside their own prefix or
/// partition key are rejected whatever lookup resolved them.
pub fn build_tenant_context(
    request: &RawRequest,
    identity: &dyn IdentityLookup,
) -> PartitionResult<BaseContext> {
    let tenant = identity
        .resolve(request)
        .ok_or_else(|| PartitionError::MissingFields(vec![X_TOKEN.to_string()]))?;
    check_identity(&tenant.tenant_id, &tenant.user_id).map_err(PartitionError::Identity)?;

    let object = match request.body() {
        Some(body) => ObjectPayload::from_body(body)?,
        None => ObjectPayload::default(),
    };

    Ok(BaseContext { tenant, object })
}

/// Approach-specific identifiers attached to a request context
pub trait ResourceScope {
    /// Add the scope's template values
    fn extend_placeholders(&self, values: &mut Placeholders);
}

/// Base context plus the resources one approach derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext<S> {
    pub tenant: TenantContext,
    pub object: ObjectPayload,
    pub bucket_name: String,
    pub bucket_arn: String,
    pub scope: S,
}

impl<S: ResourceScope> RequestContext<S> {
    pub fn new(base: BaseContext, bucket_name: String, bucket_arn: String, scope: S) -> Self {
        Self {
            tenant: base.tenant,
            object: base.object,
            bucket_name,
            bucket_arn,
            scope,
        }
    }

    /// Values the session policy template is rendered with. The identity
    /// token is deliberately absent.
    pub fn placeholders(&self) -> Placeholders {
        let mut values = Placeholders::new();
        values.insert("tenant_id".to_string(), self.tenant.tenant_id.clone());
        values.insert("user_id".to_string(), self.tenant.user_id.clone());
        values.insert("bucket_name".to_string(), self.bucket_name.clone());
        values.insert("bucket_arn".to_string(), self.bucket_arn.clone());
        values.insert("object_key".to_string(), self.object.key.clone());
        self.scope.extend_placeholders(&mut values);
        values
    }
}
