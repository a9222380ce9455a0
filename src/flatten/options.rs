//! Formatting options for flattened cells

use serde::{Deserialize, Serialize};

/// Separator between the elements of a multi-valued cell
///
/// Must differ from the tabular field delimiter (a horizontal tab).
pub const JOIN_SEPARATOR: &str = ";";

/// How a property with no payload is rendered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCell {
    /// Nothing at all
    #[default]
    Blank,
    /// A quoted empty string, `""`
    Quoted,
}

impl EmptyCell {
    /// The text written for an empty cell
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "",
            Self::Quoted => "\"\"",
        }
    }
}

impl std::fmt::Display for EmptyCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => f.write_str("blank"),
            Self::Quoted => f.write_str("quoted"),
        }
    }
}

/// Options for [`PropertyFlattener`](super::PropertyFlattener)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlattenOptions {
    /// Rendering of empty payloads, applied to every kind
    pub empty_cell: EmptyCell,
}

impl FlattenOptions {
    pub fn new(empty_cell: EmptyCell) -> Self {
        Self { empty_cell }
    }
}
