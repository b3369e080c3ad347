//! # Operation Dispatcher
//!
//! Entry point for put/get requests. For each request:
//! 1. the `partition` query parameter selects an isolation approach
//! 2. the caller's identity is resolved and the body decoded
//! 3. the approach derives its resource identifiers
//! 4. the approach's policy template is rendered with those identifiers
//! 5. the rendered policy is exchanged for scoped credentials
//! 6. the approach runs the operation under those credentials
//!
//! Every failure is turned into a response here; callers always receive a
//! `Response`.

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::backend::{AssumeRoleRequest, BackendServices, ScopedCredentials};
use crate::config::PartitionConfig;
use crate::context::build_tenant_context;
use crate::errors::{format_error_chain, PartitionError, PartitionResult};
use crate::identity::{IdentityLookup, TokenManager};
use crate::observability::{Event, Logger, ObservationScope};
use crate::policy::{render, PolicyError, PolicyTemplates};
use crate::request::{RawRequest, PARTITION_PARAM, X_TENANT_ID, X_USER_ID};
use crate::response::{HttpStatus, Response};
use crate::strategy::{
    AccessPointStrategy, BucketStrategy, DbNosqlStrategy, IsolationStrategy, Outcome,
    PartitionApproach, PrefixStrategy, ScopedClient, TagStrategy,
};

/// Object operation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Put,
    Get,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Put => "put",
            Operation::Get => "get",
        }
    }
}

pub struct Dispatcher {
    config: Arc<PartitionConfig>,
    services: BackendServices,
    identity: Arc<dyn IdentityLookup>,
    templates: PolicyTemplates,
}

impl Dispatcher {
    pub fn new(
        config: Arc<PartitionConfig>,
        services: BackendServices,
        identity: Arc<dyn IdentityLookup>,
    ) -> Self {
        let templates = match &config.policy_dir {
            Some(dir) => PolicyTemplates::with_override_dir(dir),
            None => PolicyTemplates::builtin(),
        };

        Self {
            config,
            services,
            identity,
            templates,
        }
    }

    /// Validate the configuration and use its token settings for identity
    pub fn from_config(config: PartitionConfig, services: BackendServices) -> PartitionResult<Self> {
        config.validate()?;
        let identity = TokenManager::new(&config.token)?;
        Ok(Self::new(Arc::new(config), services, Arc::new(identity)))
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Store an object; 201 on success
    pub fn put_object(&self, request: &RawRequest) -> Response {
        self.dispatch(Operation::Put, request)
    }

    /// List the caller's objects; 200 on success
    pub fn get_object(&self, request: &RawRequest) -> Response {
        self.dispatch(Operation::Get, request)
    }

    pub fn dispatch(&self, operation: Operation, request: &RawRequest) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let approach = request.query_param(PARTITION_PARAM).unwrap_or_default();
        let scope = ObservationScope::with_fields(
            "DISPATCH",
            &[
                ("request_id", &request_id),
                ("operation", operation.as_str()),
                ("approach", approach),
            ],
        );

        let (response, failure) = match self.execute(operation, request) {
            Ok(Outcome::Created(value)) => (Response::success(value, HttpStatus::Created), None),
            Ok(Outcome::Listed(keys)) => (Response::success(json!(keys), HttpStatus::Ok), None),
            Err(err) => (Response::from_error(&err), Some(err)),
        };

        match failure {
            Some(err) if err.status_code() >= 500 => scope.fail(&format_error_chain(&err).join("; ")),
            _ => scope.complete_with_fields(&[("status", &response.status_code.to_string())]),
        }
        response
    }

    fn execute(&self, operation: Operation, request: &RawRequest) -> PartitionResult<Outcome> {
        match parse_approach(request)? {
            PartitionApproach::Bucket => self.run::<BucketStrategy>(operation, request),
            PartitionApproach::Prefix => self.run::<PrefixStrategy>(operation, request),
            PartitionApproach::Tag => self.run::<TagStrategy>(operation, request),
            PartitionApproach::AccessPoint => self.run::<AccessPointStrategy>(operation, request),
            PartitionApproach::DbNosql => self.run::<DbNosqlStrategy>(operation, request),
        }
    }

    fn run<S: IsolationStrategy>(
        &self,
        operation: Operation,
        request: &RawRequest,
    ) -> PartitionResult<Outcome> {
        let base = build_tenant_context(request, self.identity.as_ref()).map_err(|err| {
            if let PartitionError::MissingFields(_) = err {
                Logger::event(Event::IdentityMissing, &[("approach", S::APPROACH.as_str())]);
            }
            err
        })?;

        let ctx = S::build_context(&self.config, base)?;
        let template = self.templates.load(S::APPROACH)?;
        let policy = render(&template, &ctx.placeholders())?;
        let creds = self.exchange(&policy, S::APPROACH)?;

        let client = ScopedClient::new(&self.services, creds, &self.config);
        match operation {
            Operation::Put => S::put_object(&client, &ctx),
            Operation::Get => S::get_object(&client, &ctx),
        }
    }

    /// Assume the execution role restricted to `policy`
    fn exchange(&self, policy: &Value, approach: PartitionApproach) -> PartitionResult<ScopedCredentials> {
        let request = AssumeRoleRequest {
            role_arn: self.config.role_arn.clone(),
            session_name: self.config.session_name.clone(),
            policy: serde_json::to_string(policy).map_err(PolicyError::Serialize)?,
            duration_secs: self.config.session_duration_secs,
        };

        let creds = self.services.broker.assume_role(&request)?;
        Logger::event(
            Event::CredentialsIssued,
            &[
                ("access_key_id", &creds.access_key_id),
                ("approach", approach.as_str()),
                ("expiration", &creds.expiration.to_rfc3339()),
            ],
        );
        Ok(creds)
    }

    /// Issue an identity token for the `x-tenant-id` / `x-user-id` headers.
    /// Missing or empty headers are reported together, tenant first.
    pub fn get_token(&self, request: &RawRequest) -> Response {
        let missing: Vec<String> = [X_TENANT_ID, X_USER_ID]
            .into_iter()
            .filter(|name| request.header(name).map_or(true, str::is_empty))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Response::from_error(&PartitionError::MissingFields(missing));
        }

        let tenant_id = request.header(X_TENANT_ID).unwrap_or_default();
        let user_id = request.header(X_USER_ID).unwrap_or_default();
        match self.identity.issue(tenant_id, user_id) {
            Ok(token) => {
                Logger::event(
                    Event::TokenIssued,
                    &[("tenant_id", tenant_id), ("user_id", user_id)],
                );
                Response::success(json!({ "token": token }), HttpStatus::Ok)
            }
            Err(e) => Response::from_error(&PartitionError::from(e)),
        }
    }
}

fn parse_approach(request: &RawRequest) -> PartitionResult<PartitionApproach> {
    let selector = request.query_param(PARTITION_PARAM).unwrap_or_default();
    selector.parse().map_err(|_| {
        Logger::event(Event::ApproachRejected, &[("value", selector)]);
        PartitionError::InvalidApproach
    })
}
