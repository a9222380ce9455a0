//! Property values and their decoded kinds
//!
//! A [`PropertyValue`] keeps the JSON exactly as the API delivered it, so the
//! raw backup artifact stays lossless, next to a [`PropertyKind`] decoded from
//! the value's `type` tag. Decoding is closed: every tag maps to exactly one
//! kind, and anything unrecognised (or a recognised tag with an unexpected
//! payload shape) lands in [`PropertyKind::Other`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single property value of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct PropertyValue {
    raw: Value,
    kind: PropertyKind,
}

impl PropertyValue {
    /// The value as delivered by the API
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The decoded payload
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// The `type` tag of the value, empty when absent
    pub fn type_tag(&self) -> &str {
        type_tag(&self.raw)
    }
}

impl From<Value> for PropertyValue {
    fn from(raw: Value) -> Self {
        let kind = PropertyKind::decode(&raw);
        Self { raw, kind }
    }
}

impl From<PropertyValue> for Value {
    fn from(value: PropertyValue) -> Self {
        value.raw
    }
}

/// Kind of a property value with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Contact-like scalar: `email`, `phone_number`, `url`
    Text(Option<String>),
    /// Ordered text spans: `title`, `rich_text`
    RichText(Vec<TextSpan>),
    /// Referenced users: `people`
    People(Vec<Person>),
    /// Referenced record ids: `relation`
    Relation(Vec<String>),
    /// One label: `select`, `status`
    Select(Option<String>),
    /// Several labels: `multi_select`
    MultiSelect(Vec<String>),
    /// Computed list of groups: `rollup` of type `array`
    Rollup(Vec<RollupItem>),
    /// Anything else, with the payload found under the type tag
    Other(Value),
}

impl PropertyKind {
    /// Decode the payload of a raw property value according to its `type`
    pub fn decode(raw: &Value) -> Self {
        let tag = type_tag(raw);
        let payload = raw.get(tag).unwrap_or(&Value::Null);

        let decoded = match tag {
            "email" | "phone_number" | "url" => decode_text(payload),
            "title" | "rich_text" => decode_spans(payload).map(Self::RichText),
            "people" => serde_json::from_value(payload.clone())
                .ok()
                .map(Self::People),
            "relation" => serde_json::from_value::<Vec<RelationRef>>(payload.clone())
                .ok()
                .map(|refs| Self::Relation(refs.into_iter().map(|r| r.id).collect())),
            "select" | "status" => serde_json::from_value::<Option<SelectOption>>(payload.clone())
                .ok()
                .map(|option| Self::Select(option.map(|o| o.name))),
            "multi_select" => serde_json::from_value::<Vec<SelectOption>>(payload.clone())
                .ok()
                .map(|options| Self::MultiSelect(options.into_iter().map(|o| o.name).collect())),
            "rollup" => decode_rollup(payload),
            _ => None,
        };

        decoded.unwrap_or_else(|| Self::Other(payload.clone()))
    }
}

/// A span of formatted text; only the plain content is kept
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextSpan {
    /// Unformatted text of the span
    #[serde(default)]
    pub plain_text: String,
}

impl TextSpan {
    pub fn new(plain_text: impl Into<String>) -> Self {
        Self {
            plain_text: plain_text.into(),
        }
    }
}

/// A referenced user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Person {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    person: Option<PersonDetail>,
}

impl Person {
    pub fn new(name: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            person: Some(PersonDetail {
                email: email.map(str::to_owned),
            }),
        }
    }

    /// Contact address, if the user is a person with a visible email
    pub fn email(&self) -> Option<&str> {
        self.person.as_ref()?.email.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct PersonDetail {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct RelationRef {
    id: String,
}

#[derive(Deserialize)]
struct SelectOption {
    name: String,
}

/// One group of a rollup array
#[derive(Debug, Clone, PartialEq)]
pub enum RollupItem {
    /// Group carrying text spans
    Text(Vec<TextSpan>),
    /// Any other group, with its payload
    Value(Value),
}

fn type_tag(raw: &Value) -> &str {
    raw.get("type").and_then(Value::as_str).unwrap_or_default()
}

fn decode_text(payload: &Value) -> Option<PropertyKind> {
    match payload {
        Value::Null => Some(PropertyKind::Text(None)),
        Value::String(s) => Some(PropertyKind::Text(Some(s.clone()))),
        _ => None,
    }
}

fn decode_spans(payload: &Value) -> Option<Vec<TextSpan>> {
    serde_json::from_value(payload.clone()).ok()
}

fn decode_rollup(payload: &Value) -> Option<PropertyKind> {
    if type_tag(payload) != "array" {
        return None;
    }

    let groups = payload.get("array")?.as_array()?;
    let items = groups
        .iter()
        .map(|group| {
            let tag = type_tag(group);
            let inner = group.get(tag).unwrap_or(&Value::Null);
            match tag {
                "title" | "rich_text" => decode_spans(inner)
                    .map_or_else(|| RollupItem::Value(inner.clone()), RollupItem::Text),
                _ => RollupItem::Value(inner.clone()),
            }
        })
        .collect();

    Some(PropertyKind::Rollup(items))
}
