//! Data model module
//!
//! Records as delivered by the remote collection and the typed view of
//! their property values.

mod property;
mod record;

pub use property::{Person, PropertyKind, PropertyValue, RollupItem, TextSpan};
pub use record::{Properties, Record};
