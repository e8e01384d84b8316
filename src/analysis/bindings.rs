//! Binding classification for `import` statements and `require()` declarators.
//!
//! Every statement that pulls in an external module is turned into a
//! [`ModuleImport`]: the module path as written in the source, the scope the
//! bindings live in, and one [`Binding`] per local name worth tracing.

use tree_sitter::Node;

use crate::parser::{node_text, string_value, Preorder, ScopeId, ScopeTable, SyntaxTree};

/// The kind of statement a module was discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// ES6 import statement: `import ... from 'module'`
    ES6,
    /// CommonJS require: `const x = require('module')`
    CommonJS,
}

/// A local name bound to (part of) an external module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The name as it is read in this file.
    pub local_name: String,
    /// The module path as written in the source.
    pub module_path: String,
    /// The local name denotes the whole module (`const x = require('x')`).
    pub is_root: bool,
    /// Key to file usages under when it differs from `local_name`.
    pub alias: Option<String>,
}

impl Binding {
    /// A binding that denotes the whole module.
    pub fn root(local_name: impl Into<String>, module_path: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            module_path: module_path.into(),
            is_root: true,
            alias: None,
        }
    }

    /// A binding filed under a key of the module. The alias is dropped when it
    /// matches the local name.
    pub fn named(
        local_name: impl Into<String>,
        module_path: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let local_name = local_name.into();
        let key = key.into();
        let alias = (key != local_name).then_some(key);
        Self {
            local_name,
            module_path: module_path.into(),
            is_root: false,
            alias,
        }
    }

    /// The key usages of this binding are filed under.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.local_name)
    }
}

/// A single import or require statement and the bindings it introduces.
#[derive(Debug, Clone)]
pub struct ModuleImport {
    /// The source module (e.g., "react", "./utils", "@scope/package")
    pub module_path: String,
    pub kind: ImportKind,
    /// Scope the bindings are declared in.
    pub scope: ScopeId,
    pub bindings: Vec<Binding>,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

/// Find every import declaration, `require()` declarator and bare `require()`
/// statement, in source order.
pub fn classify_imports(tree: &SyntaxTree<'_>, scopes: &ScopeTable<'_>) -> Vec<ModuleImport> {
    let source = tree.source();
    let mut imports = Vec::new();

    for (node, _) in Preorder::new(tree.root()) {
        let import = match node.kind() {
            "import_statement" => parse_es6_import(node, source, scopes),
            "variable_declarator" => parse_require(node, source, scopes),
            "expression_statement" => parse_bare_require(node, source, scopes),
            _ => None,
        };
        imports.extend(import);
    }

    imports
}

/// Parse an ES6 import statement.
fn parse_es6_import(node: Node<'_>, source: &str, scopes: &ScopeTable<'_>) -> Option<ModuleImport> {
    let module_path = string_value(&node.child_by_field_name("source")?, source)?;
    let mut bindings = Vec::new();

    let mut cursor = node.walk();
    for clause in node.children(&mut cursor) {
        if clause.kind() == "import_clause" {
            parse_import_clause(clause, source, &module_path, &mut bindings);
        }
    }

    Some(ModuleImport {
        module_path,
        kind: ImportKind::ES6,
        scope: scopes.enclosing_scope(node),
        bindings,
        line: node.start_position().row + 1,
    })
}

/// Parse the import clause (everything between 'import' and 'from').
fn parse_import_clause(node: Node<'_>, source: &str, module_path: &str, bindings: &mut Vec<Binding>) {
    let mut cursor = node.walk();

    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                // Default import: import foo from 'module'
                let local = node_text(&child, source);
                bindings.push(Binding::named(local, module_path, "default"));
            }
            "namespace_import" => {
                // Namespace import: import * as foo from 'module'
                let mut inner = child.walk();
                let name = child
                    .named_children(&mut inner)
                    .find(|c| c.kind() == "identifier");
                if let Some(name) = name {
                    let local = node_text(&name, source);
                    bindings.push(Binding::named(local, module_path, local));
                }
            }
            "named_imports" => {
                // Named imports: import { foo, bar as baz } from 'module'
                let mut inner = child.walk();
                for specifier in child.named_children(&mut inner) {
                    if specifier.kind() == "import_specifier" {
                        bindings.extend(parse_import_specifier(specifier, source, module_path));
                    }
                }
            }
            _ => {}
        }
    }
}

/// Parse a single import specifier: foo, foo as bar, "foo-bar" as baz
fn parse_import_specifier(node: Node<'_>, source: &str, module_path: &str) -> Option<Binding> {
    let name = node.child_by_field_name("name")?;
    let imported = match name.kind() {
        "string" => string_value(&name, source)?,
        _ => node_text(&name, source).to_string(),
    };

    let local = match node.child_by_field_name("alias") {
        Some(alias) => node_text(&alias, source).to_string(),
        None if name.kind() == "identifier" => imported.clone(),
        None => return None,
    };

    Some(Binding::named(local, module_path, imported))
}

/// The module path of a `require('x')` call with a literal argument.
fn require_path(call: Node<'_>, source: &str) -> Option<String> {
    if call.kind() != "call_expression" {
        return None;
    }
    let function = call.child_by_field_name("function")?;
    if function.kind() != "identifier" || node_text(&function, source) != "require" {
        return None;
    }
    let arguments = call.child_by_field_name("arguments")?;
    string_value(&arguments.named_child(0)?, source)
}

/// Parse `const x = require('x')` and `const { a, b: c } = require('x')`.
fn parse_require(node: Node<'_>, source: &str, scopes: &ScopeTable<'_>) -> Option<ModuleImport> {
    let module_path = require_path(node.child_by_field_name("value")?, source)?;

    let pattern = node.child_by_field_name("name")?;
    let bindings = match pattern.kind() {
        "identifier" => vec![Binding::root(
            node_text(&pattern, source),
            module_path.as_str(),
        )],
        "object_pattern" => destructured_bindings(pattern, source, &module_path),
        _ => Vec::new(),
    };

    Some(ModuleImport {
        module_path,
        kind: ImportKind::CommonJS,
        scope: scopes.enclosing_scope(node),
        bindings,
        line: node.start_position().row + 1,
    })
}

/// Parse a `require('x');` statement. It binds nothing but still names a
/// module.
fn parse_bare_require(
    node: Node<'_>,
    source: &str,
    scopes: &ScopeTable<'_>,
) -> Option<ModuleImport> {
    let module_path = require_path(node.named_child(0)?, source)?;

    Some(ModuleImport {
        module_path,
        kind: ImportKind::CommonJS,
        scope: scopes.enclosing_scope(node),
        bindings: Vec::new(),
        line: node.start_position().row + 1,
    })
}

/// One binding per destructured key. Nested patterns and rest elements are
/// not tracked.
fn destructured_bindings(pattern: Node<'_>, source: &str, module_path: &str) -> Vec<Binding> {
    let text = |n: &Node<'_>| node_text(n, source).to_string();
    let mut bindings = Vec::new();
    let mut cursor = pattern.walk();

    for property in pattern.named_children(&mut cursor) {
        let (key, local) = match property.kind() {
            "shorthand_property_identifier_pattern" => (text(&property), text(&property)),
            "object_assignment_pattern" => {
                let Some(left) = property.child_by_field_name("left") else {
                    continue;
                };
                (text(&left), text(&left))
            }
            "pair_pattern" => {
                let (Some(key), Some(value)) = (
                    property.child_by_field_name("key"),
                    property.child_by_field_name("value"),
                ) else {
                    continue;
                };
                let local = match value.kind() {
                    "identifier" => value,
                    "assignment_pattern" => match value.child_by_field_name("left") {
                        Some(left) if left.kind() == "identifier" => left,
                        _ => continue,
                    },
                    _ => continue,
                };
                let key = match key.kind() {
                    "property_identifier" => text(&key),
                    "string" => match string_value(&key, source) {
                        Some(key) => key,
                        None => continue,
                    },
                    _ => continue,
                };
                (key, text(&local))
            }
            _ => continue,
        };
        bindings.push(Binding::named(local, module_path, key));
    }

    bindings
}
