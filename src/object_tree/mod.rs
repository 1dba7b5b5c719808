//! The live object tree: type dispatch, side tables, rows and the model.
//!
//! - [`registry`] — ordered family table (parent, children, sensitivity)
//! - [`side_tables`] — synthetic parents and cell-layout owners
//! - [`row`] — cached row fields and owned subscriptions
//! - [`model`] — [`ObjectTree`], the forest of rows

pub mod model;
pub mod registry;
pub mod row;
pub mod side_tables;

pub use model::{ObjectTree, TreeEvent};
pub use registry::Family;
pub use row::{Binding, Row, RowField, RowId};
pub use side_tables::SideTables;
