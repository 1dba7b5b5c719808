//! Generic ordered forest and its pre-order walker.

pub mod forest;
pub mod walker;

pub use forest::Forest;
pub use walker::{TreeNavigation, TreeWalker};
