//! Shared harness for partition integration tests
//!
//! - One in-memory backend per harness
//! - Tokens are issued through the dispatcher's own token endpoint

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tenant_partition::backend::{BackendServices, InMemoryBackend};
use tenant_partition::identity::TokenClaims;
use tenant_partition::TokenConfig;
use tenant_partition::{Dispatcher, PartitionConfig, RawRequest, Response};

pub const ACCOUNT_ID: &str = "111122223333";
pub const TABLE: &str = "object-metadata";
pub const TOKEN_SECRET: &str = "integration-test-secret";
pub const APPROACHES: [&str; 5] = ["bucket", "prefix", "tag", "access_point", "db_nosql"];

pub struct Harness {
    pub backend: Arc<InMemoryBackend>,
    pub dispatcher: Dispatcher,
}

pub fn config(region: &str) -> PartitionConfig {
    PartitionConfig::new(
        ACCOUNT_ID,
        region,
        format!("arn:aws:iam::{}:role/partition-exec", ACCOUNT_ID),
        TABLE,
    )
    .with_token_secret(TOKEN_SECRET)
}

pub fn harness() -> Harness {
    harness_with(config("us-east-1"))
}

pub fn harness_with(config: PartitionConfig) -> Harness {
    let backend = Arc::new(InMemoryBackend::new(config.region.clone()).with_table(TABLE));
    let dispatcher = Dispatcher::from_config(config, BackendServices::in_memory(backend.clone()))
        .expect("valid test configuration");
    Harness {
        backend,
        dispatcher,
    }
}

impl Harness {
    pub fn token(&self, tenant_id: &str, user_id: &str) -> String {
        let response = self.dispatcher.get_token(
            &RawRequest::new()
                .with_header("x-tenant-id", tenant_id)
                .with_header("x-user-id", user_id),
        );
        assert_eq!(response.status_code, 200, "token issue failed: {}", response.body);
        response.result().expect("token result")["token"]
            .as_str()
            .expect("token string")
            .to_string()
    }

    pub fn request(&self, approach: &str, tenant_id: &str, user_id: &str) -> RawRequest {
        RawRequest::new()
            .with_partition(approach)
            .with_header("x-token", self.token(tenant_id, user_id))
    }

    pub fn put(&self, approach: &str, tenant_id: &str, user_id: &str, key: &str, value: &str) -> Response {
        let body = json!({ "key": key, "value": value }).to_string();
        self.dispatcher
            .put_object(&self.request(approach, tenant_id, user_id).with_body(body))
    }

    pub fn get(&self, approach: &str, tenant_id: &str, user_id: &str) -> Response {
        self.dispatcher.get_object(&self.request(approach, tenant_id, user_id))
    }
}

/// Keys listed in a successful get
pub fn listed(response: &Response) -> Vec<String> {
    match response.result() {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        other => panic!("expected a list result, got {:?} ({})", other, response.body),
    }
}

/// A correctly signed token carrying arbitrary ids, bypassing the checks
/// the token endpoint applies
pub fn signed_token(tenant_id: &str, user_id: &str) -> String {
    let defaults = TokenConfig::default();
    let now = Utc::now();
    let claims = TokenClaims {
        tenant_id: tenant_id.to_string(),
        user_id: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
        iss: defaults.issuer,
        aud: defaults.audience,
        jti: "fixture".to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TOKEN_SECRET.as_bytes()),
    )
    .expect("token encodes")
}
