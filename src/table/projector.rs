//! Table projection
//!
//! The header is derived once per collection from the first record and
//! every row is projected against it by property name, never by map
//! position. Records whose property names differ from the header are
//! rejected before any row is produced.
//!
//! Identity cells and header names are escaped like property cells; the
//! original-properties column is compact JSON, which never contains a raw
//! tab or line break.

use crate::error::{Error, Result};
use crate::flatten::{escape, FlattenOptions, PropertyFlattener};
use crate::model::Record;
use std::collections::HashSet;

/// Identity column holding the record id
pub const ID_COLUMN: &str = "id";

/// Identity column holding the record url
pub const URL_COLUMN: &str = "url";

/// Optional column holding the record's properties as compact JSON
pub const ORIGINAL_PROPERTIES_COLUMN: &str = "original_properties_json";

/// One flattened record, aligned with the header
pub type Row = Vec<String>;

/// Ordered column names of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
    property_count: usize,
}

impl Header {
    /// Build a header from property names followed by the identity columns
    pub fn new(property_names: Vec<String>, include_original_properties: bool) -> Self {
        let property_count = property_names.len();
        let mut columns = property_names;
        columns.push(ID_COLUMN.to_string());
        columns.push(URL_COLUMN.to_string());
        if include_original_properties {
            columns.push(ORIGINAL_PROPERTIES_COLUMN.to_string());
        }

        Self {
            columns,
            property_count,
        }
    }

    /// All column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column names as written to the header line, escaped like cells
    pub fn cells(&self) -> Vec<String> {
        self.columns.iter().map(|name| escape(name)).collect()
    }

    /// The property columns, without the identity columns
    pub fn property_names(&self) -> &[String] {
        &self.columns[..self.property_count]
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the header has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A header with its rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Header,
    pub rows: Vec<Row>,
}

/// Options for [`TableProjector`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectorOptions {
    /// Cell formatting
    pub flatten: FlattenOptions,
    /// Append the verbatim properties as a trailing JSON column
    pub include_original_properties: bool,
}

/// Projects records into a table
#[derive(Debug, Clone, Default)]
pub struct TableProjector {
    flattener: PropertyFlattener,
    include_original_properties: bool,
}

impl TableProjector {
    /// Create a projector with the given options
    pub fn new(options: ProjectorOptions) -> Self {
        Self {
            flattener: PropertyFlattener::new(options.flatten),
            include_original_properties: options.include_original_properties,
        }
    }

    /// Derive the header from `records[0]` and project every record
    pub fn project(&self, records: &[Record]) -> Result<Table> {
        let first = records.first().ok_or(Error::EmptyInput)?;
        let header = Header::new(
            first.property_names().map(str::to_owned).collect(),
            self.include_original_properties,
        );

        validate_schema(&header, records)?;

        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| self.project_row(&header, index, record))
            .collect::<Result<Vec<_>>>()?;

        Ok(Table { header, rows })
    }

    fn project_row(&self, header: &Header, index: usize, record: &Record) -> Result<Row> {
        let mut row = Vec::with_capacity(header.len());

        for name in header.property_names() {
            let value = record.properties.get(name).ok_or_else(|| Error::SchemaMismatch {
                index,
                record_id: record.id.clone(),
                missing: vec![name.clone()],
                unexpected: Vec::new(),
            })?;
            row.push(self.flattener.flatten_value(value));
        }

        row.push(escape(&record.id));
        row.push(escape(&record.url));

        if self.include_original_properties {
            row.push(serde_json::to_string(&record.properties)?);
        }

        Ok(row)
    }
}

/// Every record must carry exactly the header's property names
fn validate_schema(header: &Header, records: &[Record]) -> Result<()> {
    let expected: HashSet<&str> = header.property_names().iter().map(String::as_str).collect();

    for (index, record) in records.iter().enumerate().skip(1) {
        let actual: HashSet<&str> = record.property_names().collect();
        if actual == expected {
            continue;
        }

        let missing = header
            .property_names()
            .iter()
            .filter(|name| !actual.contains(name.as_str()))
            .cloned()
            .collect();
        let unexpected = record
            .property_names()
            .filter(|name| !expected.contains(name))
            .map(str::to_owned)
            .collect();

        return Err(Error::SchemaMismatch {
            index,
            record_id: record.id.clone(),
            missing,
            unexpected,
        });
    }

    Ok(())
}
