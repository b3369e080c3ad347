//! # Raw Requests
//!
//! The gateway event a partition operation starts from: headers, query
//! string parameters and an optional body. Any of the three may be `null`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{PartitionError, PartitionResult};

/// Query parameter naming the partition approach
pub const PARTITION_PARAM: &str = "partition";

pub const X_TOKEN: &str = "x-token";
pub const X_TENANT_ID: &str = "x-tenant-id";
pub const X_USER_ID: &str = "x-user-id";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,

    #[serde(
        rename = "queryStringParameters",
        default,
        deserialize_with = "null_as_default"
    )]
    pub query: HashMap<String, String>,

    #[serde(default)]
    pub body: Option<String>,
}

impl RawRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a gateway event
    pub fn from_json(raw: &str) -> PartitionResult<Self> {
        serde_json::from_str(raw).map_err(PartitionError::MalformedBody)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_partition(self, approach: &str) -> Self {
        self.with_query(PARTITION_PARAM, approach)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Body, if present and not empty
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}
