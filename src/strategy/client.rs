//! Backend access under one request's scoped credentials

use crate::backend::{
    BackendServices, MetadataIndex, ObjectStore, ObjectSummary, PublicAccessBlock,
    PutObjectOutput, ScopedCredentials,
};
use crate::config::PartitionConfig;
use crate::errors::{PartitionError, PartitionResult};
use crate::observability::{Event, Logger};

/// Region in which buckets are created without a location constraint
const UNCONSTRAINED_REGION: &str = "us-east-1";

/// Backend handles bound to the credentials issued for the current request.
/// Dropped with the request; credentials are never reused.
pub struct ScopedClient<'a> {
    services: &'a BackendServices,
    creds: ScopedCredentials,
    config: &'a PartitionConfig,
}

impl<'a> ScopedClient<'a> {
    pub fn new(
        services: &'a BackendServices,
        creds: ScopedCredentials,
        config: &'a PartitionConfig,
    ) -> Self {
        Self {
            services,
            creds,
            config,
        }
    }

    pub fn creds(&self) -> &ScopedCredentials {
        &self.creds
    }

    pub fn config(&self) -> &PartitionConfig {
        self.config
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        self.services.objects.as_ref()
    }

    pub fn metadata(&self) -> &dyn MetadataIndex {
        self.services.metadata.as_ref()
    }

    /// Create the bucket if it does not exist, then lock it down.
    ///
    /// A failed existence check other than "not found" is logged and
    /// otherwise ignored; the write that follows reports the real problem.
    /// A bucket created concurrently by another request counts as present.
    pub fn ensure_bucket(&self, bucket: &str) -> PartitionResult<()> {
        let objects = self.objects();
        match objects.head_bucket(&self.creds, bucket) {
            Ok(()) => return Ok(()),
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                Logger::event(
                    Event::ProvisionCheckFailed,
                    &[("bucket", bucket), ("code", &e.code)],
                );
                return Ok(());
            }
        }

        let location = match self.config.region.as_str() {
            UNCONSTRAINED_REGION => None,
            region => Some(region),
        };
        match objects.create_bucket(&self.creds, bucket, location) {
            Ok(()) => {}
            Err(e) if e.is_already_owned() => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        objects.bucket_location(&self.creds, bucket)?;
        objects.put_public_access_block(&self.creds, bucket, &PublicAccessBlock::locked_down())?;

        Logger::event(
            Event::BucketCreated,
            &[("bucket", bucket), ("region", &self.config.region)],
        );
        Ok(())
    }

    /// Create the access point on `bucket` if it does not exist
    pub fn ensure_access_point(&self, name: &str, bucket: &str) -> PartitionResult<()> {
        let objects = self.objects();
        let account_id = self.config.account_id.as_str();

        match objects.get_access_point(&self.creds, account_id, name) {
            Ok(_) => Ok(()),
            Err(e) if e.is_no_such_access_point() => {
                match objects.create_access_point(&self.creds, account_id, name, bucket) {
                    Ok(access_point) => {
                        Logger::event(
                            Event::AccessPointCreated,
                            &[("access_point", name), ("arn", &access_point.arn)],
                        );
                        Ok(())
                    }
                    Err(e) if e.is_already_owned() => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => {
                Logger::event(
                    Event::ProvisionCheckFailed,
                    &[("access_point", name), ("code", &e.code)],
                );
                Ok(())
            }
        }
    }

    /// Write an object. Any answer other than 200 is reported as
    /// `Unavailable`; nothing is retried here.
    pub fn write_object(&self, bucket: &str, key: &str, body: &str) -> PartitionResult<PutObjectOutput> {
        let output = self
            .objects()
            .put_object(&self.creds, bucket, key, body.as_bytes())?;

        if output.status != 200 {
            Logger::event(
                Event::BackendUnavailable,
                &[
                    ("bucket", bucket),
                    ("operation", "put_object"),
                    ("status", &output.status.to_string()),
                ],
            );
            return Err(PartitionError::Unavailable);
        }

        Logger::event(Event::ObjectStored, &[("bucket", bucket), ("key", key)]);
        Ok(output)
    }

    /// List objects under `prefix`. An empty listing is `Unavailable`.
    pub fn list_nonempty(&self, target: &str, prefix: &str) -> PartitionResult<Vec<ObjectSummary>> {
        let listed = self.objects().list_objects(&self.creds, target, prefix)?;

        if listed.key_count == 0 {
            Logger::event(
                Event::BackendUnavailable,
                &[("target", target), ("operation", "list_objects"), ("prefix", prefix)],
            );
            return Err(PartitionError::Unavailable);
        }

        Logger::event(
            Event::ObjectsListed,
            &[("target", target), ("count", &listed.key_count.to_string())],
        );
        Ok(listed.contents)
    }
}

/// Final `/`-separated segment of an object key
pub fn last_segment(key: &str) -> String {
    key.rsplit('/').next().unwrap_or(key).to_string()
}
