//! Style engine: CSS node tree, stylesheet parsing, cascade, computed styles.
//!
//! - [`tokenizer`] / [`parser`] — logos tokenizer and recursive descent parser
//! - [`property`] — dense style property registry and values
//! - [`node`] — CSS nodes, computed style snapshots, `style-changed`
//! - [`engine`] — selector matching and the cascade

pub mod engine;
pub mod node;
pub mod parser;
pub mod property;
pub mod tokenizer;

pub use engine::StyleEngine;
pub use node::{ComputedStyle, ComputedValue, CssNode, CssNodeId, CssNodeRef, SourceLocation, StyleChange};
pub use parser::{parse_stylesheet, StyleParseError, StyleSheet};
pub use property::{StylePropertyId, StyleValue};
