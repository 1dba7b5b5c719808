//! # gilt-inspector
//!
//! The core of a live object-graph inspector for gilt widget toolkits: it
//! mirrors every object reachable from a set of roots into a tree model,
//! keeps that model in sync as objects change and die, and binds the
//! selected object to a set of detail pages.
//!
//! The inspector never owns what it inspects. Rows hold weak handles; every
//! subscription is released when its row goes away or its object finalizes,
//! whichever comes first.
//!
//! ## Core Systems
//!
//! - **[`object`]** — The toolkit object model being inspected: classes, handles, signals, widgets
//! - **[`style`]** — CSS nodes, stylesheet parsing, cascade and computed styles
//! - **[`tree`]** — Slotmap forest and the pre-order search walker
//! - **[`object_tree`]** — Class registry, side tables and the live tree model
//! - **[`inspector`]** — Lifecycle hooks, deferred work queue, selection and the public handle
//! - **[`pages`]** — Property list, CSS nodes, size groups, gestures, misc info, resources
//! - **[`visuals`]** — Visual-id cache on the root window
//! - **[`config`]** — Inspector configuration
//! - **[`testing`]** — Fixture builders and tree dumps

// Foundation
pub mod config;
pub mod tree;

// Inspected toolkit
pub mod object;
pub mod style;

// Inspector
pub mod inspector;
pub mod object_tree;
pub mod pages;
pub mod visuals;

// Test support
pub mod testing;

pub use config::InspectorConfig;
pub use inspector::{Inspector, InspectorError};
