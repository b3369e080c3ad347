//! ObservationScope for BEGIN/COMPLETE logging around a unit of work
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` or `{name}_FAILED` when resolved
//! - Logs `{name}_INCOMPLETE` if dropped unresolved

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

pub struct ObservationScope<'a> {
    name: &'a str,
    resolved: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    started_at: Instant,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Create a scope whose fields are repeated on every line it logs
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            resolved: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started_at: Instant::now(),
        }
    }

    fn merged_fields<'b>(&'b self, elapsed: &'b str, extra: &[(&'b str, &'b str)]) -> Vec<(&'b str, &'b str)> {
        let mut all: Vec<(&str, &str)> = self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all.push(("elapsed_ms", elapsed));
        all.extend(extra.iter().copied());
        all
    }

    /// Mark the scope as completed, attaching result fields
    pub fn complete_with_fields(self, extra: &[(&str, &str)]) {
        self.resolved.set(true);
        let elapsed = self.started_at.elapsed().as_millis().to_string();
        Logger::info(
            &format!("{}_COMPLETE", self.name),
            &self.merged_fields(&elapsed, extra),
        );
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as failed
    pub fn fail(self, reason: &str) {
        self.resolved.set(true);
        let elapsed = self.started_at.elapsed().as_millis().to_string();
        Logger::error(
            &format!("{}_FAILED", self.name),
            &self.merged_fields(&elapsed, &[("reason", reason)]),
        );
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.resolved.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}
