//! Access-point isolation
//!
//! Objects are written under the tenant prefix of a shared bucket. Each
//! tenant gets its own access point on that bucket and reads list through
//! the access point's ARN.

use super::client::{last_segment, ScopedClient};
use super::{created, listing_prefix, tenant_prefix, IsolationStrategy, Outcome, PartitionApproach};
use crate::config::PartitionConfig;
use crate::context::{BaseContext, RequestContext, ResourceScope};
use crate::errors::PartitionResult;
use crate::policy::Placeholders;

const MAX_ACCESS_POINT_NAME: usize = 50;

/// Derive an access point name from a tenant id: drop `_` and `.`, strip
/// one leading and one trailing `-`, keep at most 50 characters, lowercase.
pub fn sanitize_access_point_name(tenant_id: &str) -> String {
    let cleaned: String = tenant_id.chars().filter(|c| *c != '_' && *c != '.').collect();
    let trimmed = cleaned.strip_prefix('-').unwrap_or(&cleaned);
    let trimmed = trimmed.strip_suffix('-').unwrap_or(trimmed);
    trimmed
        .chars()
        .take(MAX_ACCESS_POINT_NAME)
        .collect::<String>()
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointScope {
    pub prefix: String,
    pub access_point_name: String,
    pub access_point_arn: String,
}

impl ResourceScope for AccessPointScope {
    fn extend_placeholders(&self, values: &mut Placeholders) {
        values.insert("prefix".to_string(), self.prefix.clone());
        values.insert("access_point_name".to_string(), self.access_point_name.clone());
        values.insert("access_point_arn".to_string(), self.access_point_arn.clone());
    }
}

pub struct AccessPointStrategy;

impl IsolationStrategy for AccessPointStrategy {
    type Scope = AccessPointScope;

    const APPROACH: PartitionApproach = PartitionApproach::AccessPoint;

    fn build_context(
        config: &PartitionConfig,
        base: BaseContext,
    ) -> PartitionResult<RequestContext<AccessPointScope>> {
        let access_point_name = sanitize_access_point_name(&base.tenant.tenant_id);
        let bucket_name = format!("{}-{}", config.bucket_names.access_point, config.account_id);
        let bucket_arn = config.bucket_arn(&bucket_name);
        let scope = AccessPointScope {
            prefix: tenant_prefix(&base),
            access_point_arn: config.access_point_arn(&access_point_name),
            access_point_name,
        };
        Ok(RequestContext::new(base, bucket_name, bucket_arn, scope))
    }

    fn put_object(
        client: &ScopedClient<'_>,
        ctx: &RequestContext<AccessPointScope>,
    ) -> PartitionResult<Outcome> {
        let key = format!("{}/{}", ctx.scope.prefix, ctx.object.require_key()?);
        client.ensure_bucket(&ctx.bucket_name)?;
        client.ensure_access_point(&ctx.scope.access_point_name, &ctx.bucket_name)?;

        let output = client.write_object(&ctx.bucket_name, &key, &ctx.object.value)?;
        created(&output)
    }

    /// The access point must already exist; a missing one surfaces as
    /// `NoSuchAccessPoint`
    fn get_object(
        client: &ScopedClient<'_>,
        ctx: &RequestContext<AccessPointScope>,
    ) -> PartitionResult<Outcome> {
        client.objects().get_access_point(
            client.creds(),
            &client.config().account_id,
            &ctx.scope.access_point_name,
        )?;

        let objects = client.list_nonempty(
            &ctx.scope.access_point_arn,
            &listing_prefix(&ctx.scope.prefix),
        )?;
        Ok(Outcome::Listed(
            objects.iter().map(|o| last_segment(&o.key)).collect(),
        ))
    }
}
