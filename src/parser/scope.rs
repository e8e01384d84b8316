//! Lexical scope table for JavaScript/TypeScript syntax trees.
//!
//! [`ScopeTable::build`] makes two passes over the tree. The first records
//! every scope and the names declared in it (imports, `var`/`let`/`const`,
//! functions, classes, parameters, catch parameters). The second resolves every
//! identifier read to the innermost scope that declares the name, so a
//! parameter that shadows an import is never mistaken for the import.
//!
//! `var` declarations are hoisted to the nearest function (or program) scope;
//! everything else lives in the scope that lexically contains it. Function and
//! class declarations are visible throughout their scope, including before the
//! declaration.

use std::collections::{HashMap, HashSet};

use tree_sitter::Node;

use super::{node_text, Preorder};

/// Opaque identifier for a [`Scope`] in the [`ScopeTable`].
pub type ScopeId = usize;

/// The outermost scope of every table.
pub const PROGRAM_SCOPE: ScopeId = 0;

/// The kind of a lexical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The module itself.
    Program,
    /// Functions, arrow functions and methods; `var` is hoisted here.
    Function,
    /// `{ ... }` blocks, loop headers and `switch` bodies.
    Block,
    /// A `catch (param) { ... }` clause.
    Catch,
    /// A class; holds the class name of a named class expression.
    Class,
}

impl ScopeKind {
    /// Returns `true` if `var` declarations are hoisted to this kind of scope.
    pub fn is_function_boundary(self) -> bool {
        matches!(self, ScopeKind::Program | ScopeKind::Function)
    }

    fn of(kind: &str) -> Option<Self> {
        match kind {
            "program" => Some(ScopeKind::Program),
            "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition" => Some(ScopeKind::Function),
            "statement_block" | "for_statement" | "for_in_statement" | "switch_body" => {
                Some(ScopeKind::Block)
            }
            "catch_clause" => Some(ScopeKind::Catch),
            "class" | "class_declaration" => Some(ScopeKind::Class),
            _ => None,
        }
    }
}

/// A single lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    symbols: HashMap<String, usize>,
}

impl Scope {
    /// Returns true if `name` is declared directly in this scope.
    pub fn declares(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }
}

#[derive(Debug, Clone)]
struct Symbol<'tree> {
    references: Vec<Node<'tree>>,
}

/// Scopes, their declarations, and the read-references of every declared name.
#[derive(Debug)]
pub struct ScopeTable<'tree> {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol<'tree>>,
    /// Scope-creating node id -> the scope it creates.
    node_scopes: HashMap<usize, ScopeId>,
}

impl<'tree> ScopeTable<'tree> {
    /// Build the table for a `program` node.
    pub fn build(root: Node<'tree>, source: &str) -> Self {
        let mut table = Self {
            scopes: Vec::new(),
            symbols: Vec::new(),
            node_scopes: HashMap::new(),
        };
        let not_reads = table.collect_declarations(root, source);
        table.resolve_references(root, source, &not_reads);
        table
    }

    /// The scope with the given id.
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Number of scopes in the table.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns true if the table holds no scopes.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Read locations of `name` as declared in `scope`, in source order.
    ///
    /// Reads from nested scopes are included unless a nested scope redeclares
    /// the name. Returns an empty slice when `scope` does not declare `name`.
    pub fn references(&self, scope: ScopeId, name: &str) -> &[Node<'tree>] {
        self.scopes
            .get(scope)
            .and_then(|s| s.symbols.get(name))
            .map_or(&[], |&symbol| self.symbols[symbol].references.as_slice())
    }

    /// The innermost scope containing `node`, excluding any scope `node`
    /// itself creates.
    pub fn enclosing_scope(&self, node: Node<'_>) -> ScopeId {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if let Some(&id) = self.node_scopes.get(&ancestor.id()) {
                return id;
            }
            current = ancestor.parent();
        }
        PROGRAM_SCOPE
    }

    /// Walk the parent chain of `scope` looking for a declaration of `name`.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scopes.get(id)?;
            if scope.declares(name) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    fn push_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope {
            kind,
            parent,
            symbols: HashMap::new(),
        });
        self.scopes.len() - 1
    }

    fn declare(&mut self, scope: ScopeId, name: &str) {
        if self.scopes[scope].symbols.contains_key(name) {
            return;
        }
        self.symbols.push(Symbol {
            references: Vec::new(),
        });
        let symbol = self.symbols.len() - 1;
        self.scopes[scope].symbols.insert(name.to_string(), symbol);
    }

    fn declare_all(
        &mut self,
        scope: ScopeId,
        names: Vec<Node<'tree>>,
        source: &str,
        not_reads: &mut HashSet<usize>,
    ) {
        for name in names {
            not_reads.insert(name.id());
            self.declare(scope, node_text(&name, source));
        }
    }

    fn hoist_target(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        loop {
            let s = &self.scopes[current];
            match s.parent {
                Some(parent) if !s.kind.is_function_boundary() => current = parent,
                _ => return current,
            }
        }
    }

    /// First pass: scopes and declarations. Returns the ids of identifier
    /// nodes that must not be treated as reads.
    fn collect_declarations(&mut self, root: Node<'tree>, source: &str) -> HashSet<usize> {
        let mut not_reads = HashSet::new();
        let mut stack: Vec<(usize, ScopeId)> = Vec::new();

        for (node, depth) in Preorder::new(root) {
            while stack.last().is_some_and(|&(d, _)| d >= depth) {
                stack.pop();
            }
            let outer = stack.last().map(|&(_, id)| id);

            let own = ScopeKind::of(node.kind()).map(|kind| {
                let id = self.push_scope(kind, outer);
                self.node_scopes.insert(node.id(), id);
                stack.push((depth, id));
                id
            });
            let current = own.or(outer).unwrap_or(PROGRAM_SCOPE);
            let enclosing = outer.unwrap_or(PROGRAM_SCOPE);

            match node.kind() {
                "variable_declarator" => {
                    let Some(pattern) = node.child_by_field_name("name") else {
                        continue;
                    };
                    let is_var = node
                        .parent()
                        .is_some_and(|p| p.kind() == "variable_declaration");
                    let scope = if is_var {
                        self.hoist_target(current)
                    } else {
                        current
                    };
                    self.declare_all(scope, pattern_names(pattern), source, &mut not_reads);
                }
                "function_declaration"
                | "generator_function_declaration"
                | "class_declaration"
                | "enum_declaration" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        self.declare_all(enclosing, vec![name], source, &mut not_reads);
                    }
                }
                "function_expression" | "function" | "generator_function" | "class" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        self.declare_all(current, vec![name], source, &mut not_reads);
                    }
                }
                "formal_parameters" => {
                    // Parameters of function types in annotations bind nothing.
                    let in_function = node
                        .parent()
                        .and_then(|p| ScopeKind::of(p.kind()))
                        .is_some_and(|kind| kind == ScopeKind::Function);
                    if !in_function {
                        continue;
                    }
                    let mut cursor = node.walk();
                    let params: Vec<_> = node.named_children(&mut cursor).collect();
                    for param in params {
                        self.declare_all(current, pattern_names(param), source, &mut not_reads);
                    }
                }
                "arrow_function" | "catch_clause" => {
                    if let Some(param) = node.child_by_field_name("parameter") {
                        self.declare_all(current, pattern_names(param), source, &mut not_reads);
                    }
                }
                "import_statement" => {
                    mark_identifiers(node, &mut not_reads);
                    self.declare_all(current, import_locals(node), source, &mut not_reads);
                }
                "export_statement" if node.child_by_field_name("source").is_some() => {
                    // `export { a } from 'b'` reads nothing from this module.
                    mark_identifiers(node, &mut not_reads);
                }
                "export_specifier" => {
                    if let Some(alias) = node.child_by_field_name("alias") {
                        not_reads.insert(alias.id());
                    }
                }
                "for_in_statement" => {
                    let Some(left) = node.child_by_field_name("left") else {
                        continue;
                    };
                    match node.child_by_field_name("kind") {
                        Some(kind) => {
                            let scope = if node_text(&kind, source) == "var" {
                                self.hoist_target(current)
                            } else {
                                current
                            };
                            self.declare_all(scope, pattern_names(left), source, &mut not_reads);
                        }
                        // `for (x of xs)` assigns to an existing name.
                        None if left.kind() == "identifier" => {
                            not_reads.insert(left.id());
                        }
                        None => {}
                    }
                }
                "assignment_expression" => {
                    if let Some(left) = node.child_by_field_name("left") {
                        if left.kind() == "identifier" {
                            not_reads.insert(left.id());
                        }
                    }
                }
                _ => {}
            }
        }

        not_reads
    }

    /// Second pass: attach every identifier read to its declaring scope.
    fn resolve_references(&mut self, root: Node<'tree>, source: &str, not_reads: &HashSet<usize>) {
        let mut stack: Vec<(usize, ScopeId)> = Vec::new();

        for (node, depth) in Preorder::new(root) {
            while stack.last().is_some_and(|&(d, _)| d >= depth) {
                stack.pop();
            }
            if let Some(&id) = self.node_scopes.get(&node.id()) {
                stack.push((depth, id));
            }

            if !matches!(node.kind(), "identifier" | "shorthand_property_identifier")
                || not_reads.contains(&node.id())
            {
                continue;
            }

            let current = stack.last().map_or(PROGRAM_SCOPE, |&(_, id)| id);
            let name = node_text(&node, source);
            if let Some(scope) = self.resolve(current, name) {
                let symbol = self.scopes[scope].symbols[name];
                self.symbols[symbol].references.push(node);
            }
        }
    }
}

/// Every identifier bound by a declaration pattern, in source order.
pub fn pattern_names(pattern: Node<'_>) -> Vec<Node<'_>> {
    let mut names = Vec::new();
    let mut stack = vec![pattern];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => names.push(node),
            "object_pattern" | "array_pattern" | "rest_pattern" => {
                let mut cursor = node.walk();
                let children: Vec<_> = node.named_children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
            "pair_pattern" => stack.extend(node.child_by_field_name("value")),
            "object_assignment_pattern" | "assignment_pattern" => {
                stack.extend(node.child_by_field_name("left"))
            }
            "required_parameter" | "optional_parameter" => {
                stack.extend(node.child_by_field_name("pattern"))
            }
            _ => {}
        }
    }

    names
}

fn mark_identifiers(node: Node<'_>, not_reads: &mut HashSet<usize>) {
    for (inner, _) in Preorder::new(node) {
        if inner.kind() == "identifier" {
            not_reads.insert(inner.id());
        }
    }
}

/// Local names introduced by an `import` statement.
fn import_locals(import: Node<'_>) -> Vec<Node<'_>> {
    let mut locals = Vec::new();
    for (node, _) in Preorder::new(import) {
        match node.kind() {
            "import_clause" => {
                let mut cursor = node.walk();
                locals.extend(
                    node.named_children(&mut cursor)
                        .filter(|c| c.kind() == "identifier"),
                );
            }
            "namespace_import" => {
                let mut cursor = node.walk();
                locals.extend(
                    node.named_children(&mut cursor)
                        .filter(|c| c.kind() == "identifier"),
                );
            }
            "import_specifier" => {
                let local = node
                    .child_by_field_name("alias")
                    .or_else(|| node.child_by_field_name("name"))
                    .filter(|n| n.kind() == "identifier");
                locals.extend(local);
            }
            _ => {}
        }
    }
    locals
}
