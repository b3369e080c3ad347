//! Bucket-per-tenant isolation

use super::client::{last_segment, ScopedClient};
use super::{created, IsolationStrategy, Outcome, PartitionApproach};
use crate::config::PartitionConfig;
use crate::context::{BaseContext, RequestContext, ResourceScope};
use crate::errors::PartitionResult;
use crate::policy::Placeholders;

/// The bucket itself is the tenant boundary; nothing else is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketScope;

impl ResourceScope for BucketScope {
    fn extend_placeholders(&self, _values: &mut Placeholders) {}
}

pub struct BucketStrategy;

impl IsolationStrategy for BucketStrategy {
    type Scope = BucketScope;

    const APPROACH: PartitionApproach = PartitionApproach::Bucket;

    fn build_context(
        config: &PartitionConfig,
        base: BaseContext,
    ) -> PartitionResult<RequestContext<BucketScope>> {
        let bucket_name = format!(
            "{}-{}-{}",
            config.bucket_names.bucket, base.tenant.tenant_id, config.account_id
        );
        let bucket_arn = config.bucket_arn(&bucket_name);
        Ok(RequestContext::new(base, bucket_name, bucket_arn, BucketScope))
    }

    fn put_object(client: &ScopedClient<'_>, ctx: &RequestContext<BucketScope>) -> PartitionResult<Outcome> {
        let key = ctx.object.require_key()?;
        client.ensure_bucket(&ctx.bucket_name)?;
        let output = client.write_object(&ctx.bucket_name, key, &ctx.object.value)?;
        created(&output)
    }

    fn get_object(client: &ScopedClient<'_>, ctx: &RequestContext<BucketScope>) -> PartitionResult<Outcome> {
        let objects = client.list_nonempty(&ctx.bucket_name, "")?;
        Ok(Outcome::Listed(
            objects.iter().map(|o| last_segment(&o.key)).collect(),
        ))
    }
}
