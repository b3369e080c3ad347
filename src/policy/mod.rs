//! # Session Policies
//!
//! Per-approach policy templates and the renderer that fills them with
//! tenant-derived resource identifiers before credential exchange.

pub mod errors;
pub mod render;
pub mod templates;

pub use errors::{PolicyError, PolicyResult};
pub use render::{render, substitute, Placeholders};
pub use templates::PolicyTemplates;
