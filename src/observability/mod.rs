//! # Observability
//!
//! Structured logging for the partition layer:
//! - One JSON object per line, sorted keys
//! - Typed lifecycle events
//! - Scopes that log BEGIN/COMPLETE/FAILED around a request
//!
//! Secrets (identity tokens, secret keys, session tokens) are never passed
//! to the logger.
//!
//! ```ignore
//! use tenant_partition::observability::{Event, Logger, ObservationScope};
//!
//! Logger::event(Event::BucketCreated, &[("bucket", "aws-saas-s3-prefix-111122223333")]);
//!
//! let scope = ObservationScope::with_fields("DISPATCH", &[("operation", "put")]);
//! scope.complete_with_fields(&[("status", "201")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;
