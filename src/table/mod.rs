//! Table module
//!
//! Projects a collection's records into a header and positionally aligned
//! rows of printable cells.

mod projector;

pub use projector::{
    Header, ProjectorOptions, Row, Table, TableProjector, ID_COLUMN, ORIGINAL_PROPERTIES_COLUMN,
    URL_COLUMN,
};
