//! # Isolation Strategies
//!
//! Five ways of partitioning tenant data in shared storage. Each strategy
//! derives its resource identifiers from the tenant context and implements
//! put/get under the scoped credentials issued for the request.
//!
//! | Approach       | Bucket                         | Key                      |
//! |----------------|--------------------------------|--------------------------|
//! | `bucket`       | `{base}-{tenant}-{account}`    | `{key}`                  |
//! | `prefix`       | `{base}-{account}`             | `{tenant}/{user}/{key}`  |
//! | `tag`          | `{base}-{account}`             | `{tenant}/{user}/{key}`  |
//! | `access_point` | `{base}-{account}`             | `{tenant}/{user}/{key}`  |
//! | `db_nosql`     | `{base}-{account}`             | `{tenant}/{user}/{key}`  |
//!
//! Selection is a closed `match` over `PartitionApproach`.

pub mod access_point;
pub mod approach;
pub mod bucket;
pub mod client;
pub mod db_nosql;
pub mod prefix;
pub mod tag;

use serde_json::Value;

pub use access_point::{sanitize_access_point_name, AccessPointScope, AccessPointStrategy};
pub use approach::{PartitionApproach, UnknownApproach};
pub use bucket::{BucketScope, BucketStrategy};
pub use client::{last_segment, ScopedClient};
pub use db_nosql::{DbNosqlStrategy, NosqlScope};
pub use prefix::{PrefixScope, PrefixStrategy};
pub use tag::{TagScope, TagStrategy};

use crate::config::PartitionConfig;
use crate::context::{BaseContext, RequestContext, ResourceScope};
use crate::errors::{PartitionError, PartitionResult};

/// Result of a successful strategy operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Write confirmed; carries the backend's answer
    Created(Value),
    /// Final path segments of the caller's objects
    Listed(Vec<String>),
}

/// One tenant isolation approach
pub trait IsolationStrategy {
    type Scope: ResourceScope;

    const APPROACH: PartitionApproach;

    /// Derive the approach's resource identifiers. Pure; no backend calls.
    fn build_context(
        config: &PartitionConfig,
        base: BaseContext,
    ) -> PartitionResult<RequestContext<Self::Scope>>;

    fn put_object(
        client: &ScopedClient<'_>,
        ctx: &RequestContext<Self::Scope>,
    ) -> PartitionResult<Outcome>;

    fn get_object(
        client: &ScopedClient<'_>,
        ctx: &RequestContext<Self::Scope>,
    ) -> PartitionResult<Outcome>;
}

/// Prefix shared by the prefix-based approaches
pub(crate) fn tenant_prefix(base: &BaseContext) -> String {
    format!("{}/{}", base.tenant.tenant_id, base.tenant.user_id)
}

/// Listing prefix: the tenant prefix with its trailing separator, so that
/// `t1/u1` never matches keys of user `u10`
pub(crate) fn listing_prefix(prefix: &str) -> String {
    format!("{}/", prefix)
}

/// Serialize a backend answer into an outcome
pub(crate) fn created<T: serde::Serialize>(output: &T) -> PartitionResult<Outcome> {
    serde_json::to_value(output)
        .map(Outcome::Created)
        .map_err(|e| PartitionError::internal(format!("cannot encode backend answer: {}", e)))
}
