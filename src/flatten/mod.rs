//! Flattening module
//!
//! Maps heterogeneous property values to deterministic string cells.
//! Flattening is pure: the same input always yields the same cells.

mod flattener;
mod options;

pub use flattener::PropertyFlattener;
pub(crate) use flattener::escape;
pub use options::{EmptyCell, FlattenOptions, JOIN_SEPARATOR};

#[cfg(test)]
mod tests;
