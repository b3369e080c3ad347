//! Key-prefix isolation in a shared bucket

use super::client::{last_segment, ScopedClient};
use super::{created, listing_prefix, tenant_prefix, IsolationStrategy, Outcome, PartitionApproach};
use crate::config::PartitionConfig;
use crate::context::{BaseContext, RequestContext, ResourceScope};
use crate::errors::PartitionResult;
use crate::policy::Placeholders;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixScope {
    /// `tenant_id/user_id`
    pub prefix: String,
}

impl ResourceScope for PrefixScope {
    fn extend_placeholders(&self, values: &mut Placeholders) {
        values.insert("prefix".to_string(), self.prefix.clone());
    }
}

pub struct PrefixStrategy;

impl IsolationStrategy for PrefixStrategy {
    type Scope = PrefixScope;

    const APPROACH: PartitionApproach = PartitionApproach::Prefix;

    fn build_context(
        config: &PartitionConfig,
        base: BaseContext,
    ) -> PartitionResult<RequestContext<PrefixScope>> {
        let bucket_name = format!("{}-{}", config.bucket_names.prefix, config.account_id);
        let bucket_arn = config.bucket_arn(&bucket_name);
        let prefix = tenant_prefix(&base);
        Ok(RequestContext::new(base, bucket_name, bucket_arn, PrefixScope { prefix }))
    }

    fn put_object(client: &ScopedClient<'_>, ctx: &RequestContext<PrefixScope>) -> PartitionResult<Outcome> {
        let key = format!("{}/{}", ctx.scope.prefix, ctx.object.require_key()?);
        client.ensure_bucket(&ctx.bucket_name)?;
        let output = client.write_object(&ctx.bucket_name, &key, &ctx.object.value)?;
        created(&output)
    }

    fn get_object(client: &ScopedClient<'_>, ctx: &RequestContext<PrefixScope>) -> PartitionResult<Outcome> {
        let objects = client.list_nonempty(&ctx.bucket_name, &listing_prefix(&ctx.scope.prefix))?;
        Ok(Outcome::Listed(
            objects.iter().map(|o| last_segment(&o.key)).collect(),
        ))
    }
}
