//! tenant-partition - Multi-tenant object storage access layer
//!
//! Requests carry an identity token and select one of five tenant isolation
//! approaches. For each request the layer derives tenant-scoped resource
//! identifiers, renders a session policy restricted to them, exchanges that
//! policy for short-lived credentials and runs the storage operation under
//! those credentials.
//!
//! A deployment supplies its own `ObjectStore`, `CredentialBroker` and
//! `MetadataIndex` clients. `InMemoryBackend` stands in for all three in
//! tests and local runs.
//!
//! ```ignore
//! use std::sync::Arc;
//! use tenant_partition::backend::BackendServices;
//! use tenant_partition::{Dispatcher, PartitionConfig, RawRequest};
//!
//! let config = PartitionConfig::from_env()?;
//! let services = BackendServices::new(Arc::new(store), Arc::new(broker), Arc::new(index));
//! let dispatcher = Dispatcher::from_config(config, services)?;
//!
//! let response = dispatcher.get_object(&RawRequest::from_json(event)?);
//! ```

pub mod backend;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod identity;
pub mod observability;
pub mod policy;
pub mod request;
pub mod response;
pub mod strategy;

pub use config::{BucketNames, ConfigError, PartitionConfig, TokenConfig};
pub use context::{BaseContext, ObjectPayload, RequestContext, TenantContext};
pub use dispatcher::{Dispatcher, Operation};
pub use errors::{PartitionError, PartitionResult};
pub use request::RawRequest;
pub use response::{HttpStatus, Response};
pub use strategy::{IsolationStrategy, Outcome, PartitionApproach};
