//! # Partition Configuration
//!
//! Deployment settings for the partition layer: account, region, execution
//! role, metadata table and per-approach bucket base names. Built once at
//! startup and shared read-only by every request.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_ACCOUNT_ID: &str = "AWS_ACCOUNT_ID";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_ROLE_ARN: &str = "IAMROLE_LMDEXEC_ARN";
pub const ENV_TABLE_NAME: &str = "NOSQL_DBTABLE_NAME";
pub const ENV_TOKEN_SECRET: &str = "TOKEN_SECRET";
pub const ENV_TOKEN_TTL_SECS: &str = "TOKEN_TTL_SECS";
pub const ENV_POLICY_DIR: &str = "POLICY_DIR";

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Cannot read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Base bucket names, one per partition approach. The account id (and for
/// the bucket approach, the tenant id) is appended per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketNames {
    #[serde(default = "default_bucket_base")]
    pub bucket: String,
    #[serde(default = "default_prefix_base")]
    pub prefix: String,
    #[serde(default = "default_tag_base")]
    pub tag: String,
    #[serde(default = "default_access_point_base")]
    pub access_point: String,
    #[serde(default = "default_db_nosql_base")]
    pub db_nosql: String,
}

fn default_bucket_base() -> String {
    "aws-saas-s3".to_string()
}

fn default_prefix_base() -> String {
    "aws-saas-s3-prefix".to_string()
}

fn default_tag_base() -> String {
    "aws-saas-s3-tag".to_string()
}

fn default_access_point_base() -> String {
    "aws-saas-s3-ap".to_string()
}

fn default_db_nosql_base() -> String {
    "aws-saas-s3-dbns".to_string()
}

impl Default for BucketNames {
    fn default() -> Self {
        Self {
            bucket: default_bucket_base(),
            prefix: default_prefix_base(),
            tag: default_tag_base(),
            access_point: default_access_point_base(),
            db_nosql: default_db_nosql_base(),
        }
    }
}

/// Identity token settings
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// HMAC signing secret
    #[serde(default, skip_serializing)]
    pub secret: String,

    #[serde(default = "default_token_ttl")]
    pub ttl_secs: u64,

    #[serde(default = "default_token_party")]
    pub issuer: String,

    #[serde(default = "default_token_party")]
    pub audience: String,
}

fn default_token_ttl() -> u64 {
    3600
}

fn default_token_party() -> String {
    "tenant-partition".to_string()
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_secs: default_token_ttl(),
            issuer: default_token_party(),
            audience: default_token_party(),
        }
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Partition layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    pub account_id: String,

    /// Region buckets and access points live in (default: "us-east-1")
    #[serde(default = "default_region")]
    pub region: String,

    /// Execution role assumed with each request's session policy
    pub role_arn: String,

    /// Metadata table for the db_nosql approach
    #[serde(default)]
    pub table_name: String,

    /// Role session name (default: "aws-saasfactory-s3")
    #[serde(default = "default_session_name")]
    pub session_name: String,

    /// Lifetime of scoped credentials; backend default when unset
    #[serde(default)]
    pub session_duration_secs: Option<u32>,

    /// Directory with `{approach}.json` templates overriding the built-ins
    #[serde(default)]
    pub policy_dir: Option<PathBuf>,

    #[serde(default)]
    pub bucket_names: BucketNames,

    #[serde(default)]
    pub token: TokenConfig,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_session_name() -> String {
    "aws-saasfactory-s3".to_string()
}

impl PartitionConfig {
    /// Minimal configuration with defaults for everything optional
    pub fn new(
        account_id: impl Into<String>,
        region: impl Into<String>,
        role_arn: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
            role_arn: role_arn.into(),
            table_name: table_name.into(),
            session_name: default_session_name(),
            session_duration_secs: None,
            policy_dir: None,
            bucket_names: BucketNames::default(),
            token: TokenConfig::default(),
        }
    }

    pub fn with_token_secret(mut self, secret: impl Into<String>) -> Self {
        self.token.secret = secret.into();
        self
    }

    pub fn with_policy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.policy_dir = Some(dir.into());
        self
    }

    /// Load from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let mut config = Self::new(
            required(ENV_ACCOUNT_ID)?,
            required(ENV_REGION)?,
            required(ENV_ROLE_ARN)?,
            required(ENV_TABLE_NAME)?,
        );
        config.token.secret = required(ENV_TOKEN_SECRET)?;

        if let Some(ttl) = lookup(ENV_TOKEN_TTL_SECS) {
            config.token.ttl_secs = ttl.parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_TOKEN_TTL_SECS,
                reason: format!("{} is not a number of seconds", ttl),
            })?;
        }
        if let Some(dir) = lookup(ENV_POLICY_DIR).filter(|v| !v.is_empty()) {
            config.policy_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.account_id.is_empty() || !self.account_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidValue {
                field: "account_id",
                reason: "must be a non-empty string of digits".to_string(),
            });
        }
        if self.region.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "region",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.role_arn.starts_with("arn:") {
            return Err(ConfigError::InvalidValue {
                field: "role_arn",
                reason: format!("{} is not an ARN", self.role_arn),
            });
        }
        if self.session_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.token.secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "token.secret",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `arn:aws:s3:::{bucket}`
    pub fn bucket_arn(&self, bucket: &str) -> String {
        format!("arn:aws:s3:::{}", bucket)
    }

    /// `arn:aws:s3:{region}:{account}:accesspoint`
    pub fn access_point_base_arn(&self) -> String {
        format!("arn:aws:s3:{}:{}:accesspoint", self.region, self.account_id)
    }

    pub fn access_point_arn(&self, name: &str) -> String {
        format!("{}/{}", self.access_point_base_arn(), name)
    }

    /// `arn:aws:dynamodb:{region}:{account}:table/{table}`
    pub fn table_arn(&self) -> String {
        format!(
            "arn:aws:dynamodb:{}:{}:table/{}",
            self.region, self.account_id, self.table_name
        )
    }
}
