//! Test helpers: fixture builders and text dumps of the object tree.
//!
//! Use [`fixtures`] to build the small widget hierarchies the scenarios run
//! against and [`dump_tree`] to render an [`ObjectTree`](crate::object_tree::ObjectTree)
//! as indented text for assertions and inline snapshots.

pub mod dump;
pub mod fixtures;

pub use dump::{dump_tree, TreeShape};
pub use fixtures::{flat_labels, seed_roots, Scene};
