//! Partition approach selector

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The five supported tenant isolation approaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionApproach {
    /// One bucket per tenant
    Bucket,
    /// `tenant_id/user_id` key prefix in a shared bucket
    Prefix,
    /// Prefix plus tenant/user object tags checked on read
    Tag,
    /// Prefix plus a per-tenant access point used for listing
    AccessPoint,
    /// Prefix plus a metadata record indexed by `tenant_id^user_id`
    DbNosql,
}

impl PartitionApproach {
    pub const ALL: [PartitionApproach; 5] = [
        PartitionApproach::Bucket,
        PartitionApproach::Prefix,
        PartitionApproach::Tag,
        PartitionApproach::AccessPoint,
        PartitionApproach::DbNosql,
    ];

    /// Selector value, also the policy template name
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionApproach::Bucket => "bucket",
            PartitionApproach::Prefix => "prefix",
            PartitionApproach::Tag => "tag",
            PartitionApproach::AccessPoint => "access_point",
            PartitionApproach::DbNosql => "db_nosql",
        }
    }
}

impl fmt::Display for PartitionApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned for a selector that names no known approach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownApproach(pub String);

impl fmt::Display for UnknownApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown partition approach: {}", self.0)
    }
}

impl std::error::Error for UnknownApproach {}

impl FromStr for PartitionApproach {
    type Err = UnknownApproach;

    /// Selector names are matched exactly
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|approach| approach.as_str() == s)
            .ok_or_else(|| UnknownApproach(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        for approach in PartitionApproach::ALL {
            assert_eq!(approach.as_str().parse::<PartitionApproach>().unwrap(), approach);
        }
    }

    #[test]
    fn test_parse_is_exact() {
        assert!("Bucket".parse::<PartitionApproach>().is_err());
        assert!("accesspoint".parse::<PartitionApproach>().is_err());
        assert!("".parse::<PartitionApproach>().is_err());
    }

    #[test]
    fn test_serde_uses_selector_names() {
        let value = serde_json::to_value(PartitionApproach::DbNosql).unwrap();
        assert_eq!(value, "db_nosql");
        let parsed: PartitionApproach = serde_json::from_str("\"access_point\"").unwrap();
        assert_eq!(parsed, PartitionApproach::AccessPoint);
    }
}
