//! # Policy Errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for policy rendering
pub type PolicyResult<T> = Result<T, PolicyError>;

#[derive(Debug, Error)]
pub enum PolicyError {
    /// A `{name}` token has no value in the request context
    #[error("Missing placeholder value: {0}")]
    MissingPlaceholder(String),

    /// Unbalanced brace or empty `{}` in a template string
    #[error("Malformed placeholder in template string: {0}")]
    MalformedPlaceholder(String),

    #[error("Cannot read policy template {path}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Policy template {name} is not valid JSON")]
    TemplateParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot serialize rendered policy")]
    Serialize(#[source] serde_json::Error),
}

impl PolicyError {
    /// Every policy failure is a server-side defect
    pub fn status_code(&self) -> u16 {
        500
    }
}
