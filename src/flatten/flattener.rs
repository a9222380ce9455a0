//! Property flattening
//!
//! Turns typed property values into printable cells. Rules per kind:
//!
//! | Kind          | Empty when                | Rendering                                  |
//! |---------------|---------------------------|--------------------------------------------|
//! | text-like     | null or `""`              | trimmed string                             |
//! | rich text     | no spans                  | trimmed span texts joined with `;`         |
//! | people        | no entries                | `name \| email` entries joined with `;`    |
//! | relation      | no entries                | ids joined with `;`                        |
//! | select        | null                      | label                                      |
//! | multi-select  | no entries                | labels joined with `;`                     |
//! | rollup        | no text in any group      | group texts joined with `;`                |
//! | other         | null, `""`, `[]` or `{}`  | trimmed string, or compact JSON            |
//!
//! Backslash, tab, newline and CR inside a cell are written as `\\`, `\t`,
//! `\n` and `\r`, so a cell never spans fields or rows.

use super::options::{FlattenOptions, JOIN_SEPARATOR};
use crate::model::{Properties, PropertyKind, PropertyValue, RollupItem, TextSpan};
use serde_json::Value;

/// Flattens property values into cells
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyFlattener {
    options: FlattenOptions,
}

impl PropertyFlattener {
    /// Create a flattener with the given options
    pub fn new(options: FlattenOptions) -> Self {
        Self { options }
    }

    /// Get the options
    pub fn options(&self) -> FlattenOptions {
        self.options
    }

    /// Flatten every property, preserving the mapping's order
    pub fn flatten(&self, properties: &Properties) -> Vec<String> {
        properties
            .values()
            .map(|value| self.flatten_value(value))
            .collect()
    }

    /// Flatten a single property value into one cell
    pub fn flatten_value(&self, value: &PropertyValue) -> String {
        let cell = match value.kind() {
            PropertyKind::Text(text) => match text.as_deref() {
                None | Some("") => None,
                Some(text) => Some(escape(text.trim())),
            },
            PropertyKind::RichText(spans) => self.join(spans.iter().map(span_text)),
            PropertyKind::People(people) => self.join(people.iter().map(|person| {
                format!(
                    "{} | {}",
                    person.name.as_deref().unwrap_or_default(),
                    person.email().unwrap_or_default()
                )
            })),
            PropertyKind::Relation(ids) => self.join(ids.iter().cloned()),
            PropertyKind::Select(label) => label.as_deref().map(escape),
            PropertyKind::MultiSelect(labels) => self.join(labels.iter().cloned()),
            PropertyKind::Rollup(items) => self.join(items.iter().flat_map(rollup_texts)),
            PropertyKind::Other(payload) => scalar_text(payload).map(|text| escape(&text)),
        };

        cell.unwrap_or_else(|| self.options.empty_cell.as_str().to_string())
    }

    /// Join elements with the in-cell separator; `None` when there are none
    fn join(&self, elements: impl Iterator<Item = String>) -> Option<String> {
        let escaped: Vec<String> = elements.map(|e| escape(&e)).collect();
        if escaped.is_empty() {
            None
        } else {
            Some(escaped.join(JOIN_SEPARATOR))
        }
    }
}

fn span_text(span: &TextSpan) -> String {
    span.plain_text.trim().to_string()
}

fn rollup_texts(item: &RollupItem) -> Vec<String> {
    match item {
        RollupItem::Text(spans) => spans.iter().map(span_text).collect(),
        RollupItem::Value(value) => scalar_text(value).into_iter().collect(),
    }
}

/// Strings verbatim (trimmed), other JSON compactly serialized
///
/// Null, `""`, `[]` and `{}` carry no value. Escaping is left to the caller.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Escape the characters that would break the tab-separated layout
pub(crate) fn escape(text: &str) -> String {
    if !text.contains(['\\', '\t', '\n', '\r']) {
        return text.to_string();
    }

    let mut escaped = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}
