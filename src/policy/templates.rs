//! # Policy Templates
//!
//! One session policy template per partition approach. Built-in templates
//! are compiled into the crate; a template directory, when configured,
//! overrides them per approach with `{dir}/{approach}.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;

use super::errors::{PolicyError, PolicyResult};
use crate::strategy::PartitionApproach;

fn builtin(approach: PartitionApproach) -> &'static str {
    match approach {
        PartitionApproach::Bucket => include_str!("../../policies/bucket.json"),
        PartitionApproach::Prefix => include_str!("../../policies/prefix.json"),
        PartitionApproach::Tag => include_str!("../../policies/tag.json"),
        PartitionApproach::AccessPoint => include_str!("../../policies/access_point.json"),
        PartitionApproach::DbNosql => include_str!("../../policies/db_nosql.json"),
    }
}

/// Template source
#[derive(Debug, Clone, Default)]
pub struct PolicyTemplates {
    override_dir: Option<PathBuf>,
}

impl PolicyTemplates {
    pub fn builtin() -> Self {
        Self { override_dir: None }
    }

    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    /// Load and parse the template for `approach`. Templates are read on
    /// every call so an override can change without a restart.
    pub fn load(&self, approach: PartitionApproach) -> PolicyResult<Value> {
        let name = approach.as_str();

        if let Some(dir) = &self.override_dir {
            let path = dir.join(format!("{}.json", name));
            match fs::read_to_string(&path) {
                Ok(raw) => return parse(&path.display().to_string(), &raw),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(PolicyError::TemplateRead { path, source }),
            }
        }

        parse(name, builtin(approach))
    }
}

fn parse(name: &str, raw: &str) -> PolicyResult<Value> {
    serde_json::from_str(raw).map_err(|source| PolicyError::TemplateParse {
        name: name.to_string(),
        source,
    })
}
