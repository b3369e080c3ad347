//! Failure responses of the dispatcher: validation, identity, backend
//! unavailability and backend client errors.

mod common;

use std::fs;

use common::{config, harness, harness_with, listed, signed_token, ACCOUNT_ID, TABLE};
use serde_json::json;
use tenant_partition::backend::{BackendError, Fault};
use tenant_partition::RawRequest;

// =============================================================================
// VALIDATION
// =============================================================================

/// Test: an unknown selector is rejected before anything else happens.
#[test]
fn test_unknown_approach_is_400_without_backend_calls() {
    let h = harness();
    let token = h.token("t1", "u1");
    let request = RawRequest::new()
        .with_partition("bucket_per_tenant")
        .with_header("x-token", token);

    for response in [h.dispatcher.put_object(&request), h.dispatcher.get_object(&request)] {
        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.result(),
            Some(json!({"invalid": "input for partition approach"}))
        );
    }
    assert!(h.backend.calls().is_empty());
}

/// Test: a put without an object key is a validation failure.
#[test]
fn test_put_without_key_is_400() {
    let h = harness();
    let response = h.put("prefix", "t1", "u1", "", "v");
    assert_eq!(response.status_code, 400);
    assert_eq!(response.result(), Some(json!({"invalid": "object key"})));
    assert!(!h.backend.bucket_exists(&format!("aws-saas-s3-prefix-{}", ACCOUNT_ID)));
}

/// Test: an undecodable body is a validation failure.
#[test]
fn test_malformed_body_is_400() {
    let h = harness();
    let request = h.request("prefix", "t1", "u1").with_body("{key: ");
    let response = h.dispatcher.put_object(&request);
    assert_eq!(response.status_code, 400);
    assert_eq!(response.result(), Some(json!({"invalid": "request body"})));
}

/// Test: a single-quoted body is accepted.
#[test]
fn test_single_quoted_body_accepted() {
    let h = harness();
    let request = h
        .request("prefix", "t1", "u1")
        .with_body("{'key': 'quoted.txt', 'value': 'v'}");
    assert_eq!(h.dispatcher.put_object(&request).status_code, 201);
    assert_eq!(listed(&h.get("prefix", "t1", "u1")), vec!["quoted.txt"]);
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Test: no token means 401 and no credential exchange.
#[test]
fn test_missing_token_is_401_without_backend_calls() {
    let h = harness();
    let request = RawRequest::new()
        .with_partition("tag")
        .with_body(r#"{"key": "a.txt", "value": "v"}"#);

    let response = h.dispatcher.put_object(&request);
    assert_eq!(response.status_code, 401);
    assert_eq!(response.result(), Some(json!({"missing_fields": ["x-token"]})));
    assert!(h.backend.calls().is_empty());
}

/// Test: a forged token is treated like a missing one.
#[test]
fn test_forged_token_is_401() {
    let h = harness();
    let request = RawRequest::new()
        .with_partition("prefix")
        .with_header("x-token", "eyJhbGciOiJIUzI1NiJ9.e30.forged");

    let response = h.dispatcher.get_object(&request);
    assert_eq!(response.status_code, 401);
    assert!(h.backend.calls().is_empty());
}

/// Test: the token endpoint names the missing identity header.
#[test]
fn test_get_token_missing_user() {
    let h = harness();
    let response = h
        .dispatcher
        .get_token(&RawRequest::new().with_header("x-tenant-id", "t1"));
    assert_eq!(response.status_code, 401);
    assert_eq!(response.result(), Some(json!({"missing_fields": ["x-user-id"]})));
}

/// Test: a request event in gateway JSON form round trips through the API.
#[test]
fn test_gateway_event_json() {
    let h = harness();
    let token = h.token("t1", "u1");
    let event = json!({
        "headers": {"X-Token": token},
        "queryStringParameters": {"partition": "prefix"},
        "body": "{\"key\": \"event.txt\", \"value\": \"v\"}"
    })
    .to_string();

    let request = RawRequest::from_json(&event).unwrap();
    assert_eq!(h.dispatcher.put_object(&request).status_code, 201);
}

// =============================================================================
// IDENTIFIER SEPARATORS
// =============================================================================

/// Test: a tenant id containing `/` cannot reach another tenant's prefix.
#[test]
fn test_slash_in_tenant_id_cannot_shadow_prefix() {
    let h = harness();
    h.put("prefix", "acme", "b", "own.txt", "mine");

    let token = h.dispatcher.get_token(
        &RawRequest::new()
            .with_header("x-tenant-id", "acme/b")
            .with_header("x-user-id", "c"),
    );
    assert_eq!(token.status_code, 400);
    assert_eq!(token.result(), Some(json!({"invalid": "x-tenant-id"})));

    let put = h.dispatcher.put_object(
        &RawRequest::new()
            .with_partition("prefix")
            .with_header("x-token", signed_token("acme/b", "c"))
            .with_body(r#"{"key": "secret.txt", "value": "s"}"#),
    );
    assert_eq!(put.status_code, 401);

    let bucket = format!("aws-saas-s3-prefix-{}", ACCOUNT_ID);
    assert!(h.backend.object_body(&bucket, "acme/b/c/secret.txt").is_none());
    assert_eq!(listed(&h.get("prefix", "acme", "b")), vec!["own.txt"]);
}

/// Test: ids containing `^` cannot share a metadata partition.
#[test]
fn test_caret_in_ids_cannot_share_partition() {
    let h = harness();
    h.put("db_nosql", "acme", "b", "own.txt", "mine");

    for (tenant_id, user_id) in [("acme^b", "c"), ("acme", "b^c")] {
        let put = h.dispatcher.put_object(
            &RawRequest::new()
                .with_partition("db_nosql")
                .with_header("x-token", signed_token(tenant_id, user_id))
                .with_body(r#"{"key": "secret.txt", "value": "s"}"#),
        );
        assert_eq!(put.status_code, 401, "{}/{}", tenant_id, user_id);
    }

    assert!(h
        .backend
        .metadata_record(TABLE, "acme^b^c", "acme^b/c/secret.txt")
        .is_none());
    assert!(h
        .backend
        .metadata_record(TABLE, "acme^b^c", "acme/b^c/secret.txt")
        .is_none());
    assert_eq!(h.backend.issued_sessions(), 1);
}

// =============================================================================
// BACKEND UNAVAILABLE
// =============================================================================

/// Test: listing nothing is a retryable failure, not an empty success.
#[test]
fn test_empty_listing_is_503() {
    for approach in ["prefix", "tag", "access_point"] {
        let h = harness();
        h.put(approach, "t1", "u1", "a.txt", "1");

        let response = h.get(approach, "t1", "u2");
        assert_eq!(response.status_code, 503, "{}: {}", approach, response.body);
        assert_eq!(response.result(), Some(json!("Operation failed. Please retry.")));
    }
}

/// Test: a write the backend does not confirm is a retryable failure.
#[test]
fn test_unconfirmed_write_is_503() {
    for approach in ["bucket", "prefix", "tag", "access_point", "db_nosql"] {
        let h = harness();
        h.backend.force_put_status(500);

        let response = h.put(approach, "t1", "u1", "a.txt", "1");
        assert_eq!(response.status_code, 503, "{}: {}", approach, response.body);
    }
}

// =============================================================================
// BACKEND CLIENT ERRORS
// =============================================================================

/// Test: a denied tag read hides that object and the rest are returned.
#[test]
fn test_tag_read_denied_excludes_object() {
    let h = harness();
    h.put("tag", "t1", "u1", "a.txt", "1");
    h.put("tag", "t1", "u1", "b.txt", "2");
    h.backend.inject_fault(
        Fault::on("get_object_tagging", BackendError::access_denied("Access Denied"))
            .for_target("t1/u1/a.txt"),
    );

    let response = h.get("tag", "t1", "u1");
    assert_eq!(response.status_code, 200);
    assert_eq!(listed(&response), vec!["b.txt"]);
}

/// Test: when every tag read is denied the result is empty, not a failure.
#[test]
fn test_tag_read_denied_for_all_objects() {
    let h = harness();
    h.put("tag", "t1", "u1", "a.txt", "1");
    h.put("tag", "t1", "u1", "b.txt", "2");
    h.backend.inject_fault(Fault::on(
        "get_object_tagging",
        BackendError::access_denied("Access Denied"),
    ));

    let response = h.get("tag", "t1", "u1");
    assert_eq!(response.status_code, 200);
    assert!(listed(&response).is_empty());
}

/// Test: any other tag read error aborts the get with the backend's code.
#[test]
fn test_tag_read_other_error_aborts() {
    let h = harness();
    h.put("tag", "t1", "u1", "a.txt", "1");
    h.put("tag", "t1", "u1", "b.txt", "2");
    h.backend.inject_fault(
        Fault::on("get_object_tagging", BackendError::new("SlowDown", "reduce request rate"))
            .for_target("t1/u1/b.txt"),
    );

    let response = h.get("tag", "t1", "u1");
    assert_eq!(response.status_code, 500);
    assert_eq!(response.message().as_deref(), Some("SlowDown"));
}

/// Test: reading through an access point that was never created fails.
#[test]
fn test_missing_access_point_surfaces_code() {
    let h = harness();
    let response = h.get("access_point", "t1", "u1");
    assert_eq!(response.status_code, 500);
    assert_eq!(response.message().as_deref(), Some("NoSuchAccessPoint"));
}

/// Test: a refused credential exchange is reported with its code.
#[test]
fn test_credential_exchange_failure() {
    let h = harness();
    h.backend
        .inject_fault(Fault::on("assume_role", BackendError::access_denied("not trusted")));

    let response = h.put("prefix", "t1", "u1", "a.txt", "1");
    assert_eq!(response.status_code, 500);
    assert_eq!(response.message().as_deref(), Some("AccessDenied"));
    assert!(!h.backend.bucket_exists(&format!("aws-saas-s3-prefix-{}", ACCOUNT_ID)));
}

/// Test: a failed metadata write fails the put.
#[test]
fn test_metadata_write_failure() {
    let h = harness();
    h.backend.inject_fault(Fault::on(
        "put_item",
        BackendError::new("ProvisionedThroughputExceededException", "slow down"),
    ));

    let response = h.put("db_nosql", "t1", "u1", "a.txt", "1");
    assert_eq!(response.status_code, 500);
    assert_eq!(
        response.message().as_deref(),
        Some("ProvisionedThroughputExceededException")
    );
}

// =============================================================================
// POLICY TEMPLATES
// =============================================================================

/// Test: a template with an unknown placeholder fails with a trace.
#[test]
fn test_template_override_with_unknown_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("prefix.json"),
        r#"{"Version":"2012-10-17","Statement":[{"Resource":"{no_such_field}"}]}"#,
    )
    .unwrap();

    let h = harness_with(config("us-east-1").with_policy_dir(dir.path()));
    let response = h.put("prefix", "t1", "u1", "a.txt", "1");
    assert_eq!(response.status_code, 500);

    let trace = response.result().unwrap().to_string();
    assert!(trace.contains("no_such_field"), "{}", trace);
    assert_eq!(h.backend.issued_sessions(), 0);
}

/// Test: an override template is what the credentials are scoped with.
#[test]
fn test_template_override_is_used() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bucket.json"),
        r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"s3:*","Resource":"{bucket_arn}/custom/*"}]}"#,
    )
    .unwrap();

    let h = harness_with(config("us-east-1").with_policy_dir(dir.path()));
    assert_eq!(h.put("bucket", "t1", "u1", "a.txt", "1").status_code, 201);

    let policy = &h.backend.session_policies()[0];
    assert_eq!(
        policy["Statement"][0]["Resource"],
        format!("arn:aws:s3:::aws-saas-s3-t1-{}/custom/*", ACCOUNT_ID)
    );
}
