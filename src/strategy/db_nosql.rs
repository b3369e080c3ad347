//! Metadata-indexed isolation
//!
//! Objects are stored under `tenant_id/user_id/key` and a metadata record
//! keyed by `tenant_id^user_id` is written for each. Reads query the index
//! instead of listing the bucket.

use super::client::{last_segment, ScopedClient};
use super::{created, tenant_prefix, IsolationStrategy, Outcome, PartitionApproach};
use crate::backend::MetadataRecord;
use crate::config::PartitionConfig;
use crate::context::{BaseContext, RequestContext, ResourceScope};
use crate::errors::PartitionResult;
use crate::observability::{Event, Logger};
use crate::policy::Placeholders;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NosqlScope {
    pub prefix: String,
    /// `tenant_id/user_id/object_key`
    pub key_name: String,
    /// `tenant_id^user_id`
    pub partition_key: String,
    pub table_name: String,
    pub table_arn: String,
}

impl ResourceScope for NosqlScope {
    fn extend_placeholders(&self, values: &mut Placeholders) {
        values.insert("prefix".to_string(), self.prefix.clone());
        values.insert("key_name".to_string(), self.key_name.clone());
        values.insert("nosql_table_arn".to_string(), self.table_arn.clone());
        values.insert("nosql_partition_key".to_string(), self.partition_key.clone());
    }
}

pub struct DbNosqlStrategy;

impl IsolationStrategy for DbNosqlStrategy {
    type Scope = NosqlScope;

    const APPROACH: PartitionApproach = PartitionApproach::DbNosql;

    fn build_context(
        config: &PartitionConfig,
        base: BaseContext,
    ) -> PartitionResult<RequestContext<NosqlScope>> {
        let bucket_name = format!("{}-{}", config.bucket_names.db_nosql, config.account_id);
        let bucket_arn = config.bucket_arn(&bucket_name);
        let prefix = tenant_prefix(&base);
        let scope = NosqlScope {
            key_name: format!("{}/{}", prefix, base.object.key),
            partition_key: format!("{}^{}", base.tenant.tenant_id, base.tenant.user_id),
            table_name: config.table_name.clone(),
            table_arn: config.table_arn(),
            prefix,
        };
        Ok(RequestContext::new(base, bucket_name, bucket_arn, scope))
    }

    /// Write the object, read back its attributes and index them
    fn put_object(client: &ScopedClient<'_>, ctx: &RequestContext<NosqlScope>) -> PartitionResult<Outcome> {
        ctx.object.require_key()?;
        let key_name = &ctx.scope.key_name;

        client.ensure_bucket(&ctx.bucket_name)?;
        client.write_object(&ctx.bucket_name, key_name, &ctx.object.value)?;

        let head = client
            .objects()
            .head_object(client.creds(), &ctx.bucket_name, key_name)?;

        let record = MetadataRecord {
            partition_key: ctx.scope.partition_key.clone(),
            key_name: key_name.clone(),
            tenant_id: ctx.tenant.tenant_id.clone(),
            user_id: ctx.tenant.user_id.clone(),
            bucket_name: ctx.bucket_name.clone(),
            url: format!("https://{}.s3.amazonaws.com/{}", ctx.bucket_name, key_name),
            last_modified: head.last_modified.to_rfc3339(),
            size: head.content_length,
            etag: head.etag,
            content_type: head.content_type,
        };

        let output = client
            .metadata()
            .put_record(client.creds(), &ctx.scope.table_name, &record)?;
        Logger::event(
            Event::MetadataRecorded,
            &[("table", &ctx.scope.table_name), ("key_name", key_name)],
        );
        created(&output)
    }

    /// An empty partition is a successful, empty result
    fn get_object(client: &ScopedClient<'_>, ctx: &RequestContext<NosqlScope>) -> PartitionResult<Outcome> {
        let key_names = client.metadata().query_key_names(
            client.creds(),
            &ctx.scope.table_name,
            &ctx.scope.partition_key,
        )?;
        Ok(Outcome::Listed(
            key_names.iter().map(|k| last_segment(k)).collect(),
        ))
    }
}
