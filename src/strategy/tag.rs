//! Tag-based isolation
//!
//! Objects live under the tenant prefix and carry `tenant_id` / `user_id`
//! tags. On read every listed object's tags are fetched under the scoped
//! credentials; the session policy only allows that for objects whose tags
//! match the caller.
//!
//! A per-object `AccessDenied` excludes the object from the result and the
//! read continues. Nothing but a WARN log line records the exclusion, so a
//! misconfigured policy can hide a caller's own objects without failing the
//! request.

use super::client::{last_segment, ScopedClient};
use super::{created, listing_prefix, tenant_prefix, IsolationStrategy, Outcome, PartitionApproach};
use crate::backend::Tag;
use crate::config::PartitionConfig;
use crate::context::{BaseContext, RequestContext, ResourceScope};
use crate::errors::PartitionResult;
use crate::observability::{Event, Logger};
use crate::policy::Placeholders;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagScope {
    pub prefix: String,
    /// Applied to every object written
    pub tags: Vec<Tag>,
}

impl ResourceScope for TagScope {
    fn extend_placeholders(&self, values: &mut Placeholders) {
        values.insert("prefix".to_string(), self.prefix.clone());
    }
}

pub struct TagStrategy;

impl IsolationStrategy for TagStrategy {
    type Scope = TagScope;

    const APPROACH: PartitionApproach = PartitionApproach::Tag;

    fn build_context(
        config: &PartitionConfig,
        base: BaseContext,
    ) -> PartitionResult<RequestContext<TagScope>> {
        let bucket_name = format!("{}-{}", config.bucket_names.tag, config.account_id);
        let bucket_arn = config.bucket_arn(&bucket_name);
        let scope = TagScope {
            prefix: tenant_prefix(&base),
            tags: vec![
                Tag::new("tenant_id", base.tenant.tenant_id.clone()),
                Tag::new("user_id", base.tenant.user_id.clone()),
            ],
        };
        Ok(RequestContext::new(base, bucket_name, bucket_arn, scope))
    }

    fn put_object(client: &ScopedClient<'_>, ctx: &RequestContext<TagScope>) -> PartitionResult<Outcome> {
        let key = format!("{}/{}", ctx.scope.prefix, ctx.object.require_key()?);
        client.ensure_bucket(&ctx.bucket_name)?;
        client.write_object(&ctx.bucket_name, &key, &ctx.object.value)?;

        let tagging = client
            .objects()
            .put_object_tagging(client.creds(), &ctx.bucket_name, &key, &ctx.scope.tags)?;
        created(&tagging)
    }

    fn get_object(client: &ScopedClient<'_>, ctx: &RequestContext<TagScope>) -> PartitionResult<Outcome> {
        client.ensure_bucket(&ctx.bucket_name)?;
        let objects = client.list_nonempty(&ctx.bucket_name, &listing_prefix(&ctx.scope.prefix))?;

        let mut visible = Vec::with_capacity(objects.len());
        for object in &objects {
            match client
                .objects()
                .get_object_tagging(client.creds(), &ctx.bucket_name, &object.key)
            {
                Ok(tagging) if tagging.status == 200 => visible.push(last_segment(&object.key)),
                Ok(_) => {}
                Err(e) if e.is_access_denied() => {
                    Logger::event(
                        Event::TagReadDenied,
                        &[
                            ("bucket", &ctx.bucket_name),
                            ("key", &object.key),
                            ("tenant_id", &ctx.tenant.tenant_id),
                        ],
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Outcome::Listed(visible))
    }
}
