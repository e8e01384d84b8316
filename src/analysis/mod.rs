//! Source code analysis module for mockscope.
//!
//! This module finds the modules a source file pulls in and the shape in
//! which each imported binding is called.
//!
//! # Features
//!
//! - Parse ES6 `import` statements (default, named, namespace imports)
//! - Parse CommonJS `require()` declarators, plain and destructured
//! - Trace every read of a binding, including inside nested functions
//! - Rebuild the member chain ending in each call (`api.users.create()`)
//!
//! # Example
//!
//! ```
//! use mockscope::analysis::{call_paths, classify_imports};
//! use mockscope::parser::{parse_source, ScopeTable, SourceLanguage};
//!
//! let tree = parse_source("const api = require('api');\napi.users.create();", SourceLanguage::JavaScript).unwrap();
//! let scopes = ScopeTable::build(tree.root(), tree.source());
//!
//! let imports = classify_imports(&tree, &scopes);
//! let binding = &imports[0].bindings[0];
//! let paths = call_paths(binding, imports[0].scope, &scopes, tree.source());
//! assert_eq!(paths, vec![vec!["users".to_string(), "create".to_string()]]);
//! ```

pub mod bindings;
pub mod usage;

// Re-export main types for convenience
pub use bindings::{classify_imports, Binding, ImportKind, ModuleImport};
pub use usage::{access_path, call_paths, enclosing_call, AccessPath};
