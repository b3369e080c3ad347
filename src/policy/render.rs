//! # Template Rendering
//!
//! Substitutes request values into a policy template. The walk recurses
//! through objects (values only, keys untouched) and arrays; string leaves
//! are rendered, every other leaf is copied as is.
//!
//! String leaves follow format-string rules:
//! - `{name}` is replaced by the value of `name`
//! - `{{` and `}}` produce literal braces
//! - a name without a value fails with `MissingPlaceholder`
//! - an unbalanced brace or `{}` fails with `MalformedPlaceholder`
//!
//! Substituted values are not scanned again.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::errors::{PolicyError, PolicyResult};

/// Named values available to a template
pub type Placeholders = BTreeMap<String, String>;

/// Render `template` against `values`. The template is not modified.
pub fn render(template: &Value, values: &Placeholders) -> PolicyResult<Value> {
    match template {
        Value::Object(map) => {
            let mut rendered = Map::with_capacity(map.len());
            for (key, value) in map {
                rendered.insert(key.clone(), render(value, values)?);
            }
            Ok(Value::Object(rendered))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| render(item, values))
            .collect::<PolicyResult<Vec<_>>>()
            .map(Value::Array),
        Value::String(text) => substitute(text, values).map(Value::String),
        other => Ok(other.clone()),
    }
}

/// Render a single template string
pub fn substitute(text: &str, values: &Placeholders) -> PolicyResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(PolicyError::MalformedPlaceholder(text.to_string()))
                        }
                        Some(ch) => name.push(ch),
                    }
                }
                if name.is_empty() {
                    return Err(PolicyError::MalformedPlaceholder(text.to_string()));
                }
                let value = values
                    .get(&name)
                    .ok_or(PolicyError::MissingPlaceholder(name))?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(PolicyError::MalformedPlaceholder(text.to_string())),
            _ => out.push(c),
        }
    }

    Ok(out)
}
