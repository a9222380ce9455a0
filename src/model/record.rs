//! Records fetched from a remote collection

use super::property::PropertyValue;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ID_KEY: &str = "id";
const URL_KEY: &str = "url";
const PROPERTIES_KEY: &str = "properties";

/// Named property values of a record, in the order the API delivered them
pub type Properties = IndexMap<String, PropertyValue>;

/// One item of a remote collection
///
/// The top-level object is kept as delivered: serializing a record writes
/// every source key in source order, with `id`, `url` and `properties`
/// taken from the typed fields. A missing `url` reads as `""` and missing
/// `properties` as an empty mapping; neither is added back on output unless
/// it was set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    /// Stable identifier, unique within the collection
    pub id: String,

    /// Canonical locator of the record (informational)
    pub url: String,

    /// Property values by name
    pub properties: Properties,

    // Source object; the properties slot holds `{}` while parsed
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record with only `id`, `url` and `properties`
    pub fn new(id: impl Into<String>, url: impl Into<String>, properties: Properties) -> Self {
        let id = id.into();
        let url = url.into();

        let mut fields = Map::new();
        fields.insert(ID_KEY.to_string(), Value::String(id.clone()));
        fields.insert(URL_KEY.to_string(), Value::String(url.clone()));
        fields.insert(PROPERTIES_KEY.to_string(), Value::Object(Map::new()));

        Self {
            id,
            url,
            properties,
            fields,
        }
    }

    /// Property names in their declared order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Any other top-level field, such as `object` or `created_time`
    pub fn field(&self, name: &str) -> Option<&Value> {
        match name {
            ID_KEY | URL_KEY | PROPERTIES_KEY => None,
            _ => self.fields.get(name),
        }
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = Error;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self> {
        let id = match fields.get(ID_KEY) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(Error::decode(format!(
                    "Record id must be a string, got {other}"
                )))
            }
            None => return Err(Error::decode("Record has no id")),
        };

        let url = match fields.get(URL_KEY) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(url)) => url.clone(),
            Some(other) => {
                return Err(Error::decode(format!(
                    "Record '{id}' url must be a string, got {other}"
                )))
            }
        };

        // A null mapping stays null in the source object
        let properties = match fields.get_mut(PROPERTIES_KEY) {
            None | Some(Value::Null) => Properties::new(),
            Some(slot) => {
                let raw = std::mem::replace(slot, Value::Object(Map::new()));
                serde_json::from_value(raw).map_err(|e| {
                    Error::decode(format!("Record '{id}' has malformed properties: {e}"))
                })?
            }
        };

        Ok(Self {
            id,
            url,
            properties,
            fields,
        })
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        let Record {
            id,
            url,
            properties,
            mut fields,
        } = record;

        fields.insert(ID_KEY.to_string(), Value::String(id));

        let url_unset = url.is_empty() && fields.get(URL_KEY).map_or(true, Value::is_null);
        if !url_unset {
            fields.insert(URL_KEY.to_string(), Value::String(url));
        }

        let properties_unset =
            properties.is_empty() && fields.get(PROPERTIES_KEY).map_or(true, Value::is_null);
        if !properties_unset {
            let properties = properties
                .into_iter()
                .map(|(name, value)| (name, Value::from(value)))
                .collect();
            fields.insert(PROPERTIES_KEY.to_string(), Value::Object(properties));
        }

        fields
    }
}
