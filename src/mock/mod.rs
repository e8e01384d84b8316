//! Mock shape model.
//!
//! This module provides the [`MockTree`] describing which properties of a
//! module are called, and the [`ModuleMockTable`] that collects one merged
//! tree per module path.
//!
//! # Example
//!
//! ```rust
//! use mockscope::mock::{MockEntry, MockTree, ModuleMockTable};
//!
//! let mut table = ModuleMockTable::new();
//! table.record_path("api", &["users", "create"]);
//! table.record_path("api", &["users", "delete"]);
//!
//! let Some(MockEntry::Factory(tree)) = table.get("api") else { panic!() };
//! assert_eq!(tree.leaf_count(), 2);
//! ```

mod table;
mod tree;

pub use table::{MockEntry, ModuleMockTable};
pub use tree::{MockNode, MockTree};
