//! Call-site discovery for tracked bindings.
//!
//! For every read of a binding, the nearest enclosing `call_expression` is
//! located by walking parent links. If the read sits at the root of that
//! call's callee, the callee's member chain is turned into an [`AccessPath`]:
//!
//! | source               | binding            | path                   |
//! |----------------------|--------------------|------------------------|
//! | `api.users.create()` | `require('api')`   | `["users", "create"]`  |
//! | `track()`            | `require('track')` | `[]`                   |
//! | `cache.flush()`      | default import     | `["default", "flush"]` |
//! | `set()`              | `{ set }`          | `["set"]`              |
//!
//! Computed members, calls used as objects and other dynamic shapes are
//! skipped silently.

use tree_sitter::Node;

use super::bindings::Binding;
use crate::parser::{node_text, ScopeId, ScopeTable};

/// Property names from the module reference to the called member. Empty
/// means the module itself was called.
pub type AccessPath = Vec<String>;

/// Every resolvable call-site path of `binding`, in source order.
///
/// `scope` is where the binding was written; a hoisted `var` is looked up in
/// the scope it was hoisted to.
pub fn call_paths(
    binding: &Binding,
    scope: ScopeId,
    scopes: &ScopeTable<'_>,
    source: &str,
) -> Vec<AccessPath> {
    let declared_in = scopes.resolve(scope, &binding.local_name).unwrap_or(scope);
    scopes
        .references(declared_in, &binding.local_name)
        .iter()
        .filter_map(|&reference| {
            let call = enclosing_call(reference)?;
            let callee = call.child_by_field_name("function")?;
            access_path(callee, reference, binding, source)
        })
        .collect()
}

/// The nearest `call_expression` ancestor of `node`.
pub fn enclosing_call(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if ancestor.kind() == "call_expression" {
            return Some(ancestor);
        }
        current = ancestor.parent();
    }
    None
}

/// Reconstruct the access path of `callee`, provided its root identifier is
/// `reference`.
pub fn access_path(
    callee: Node<'_>,
    reference: Node<'_>,
    binding: &Binding,
    source: &str,
) -> Option<AccessPath> {
    let mut segments = Vec::new();
    let mut node = callee;

    loop {
        match node.kind() {
            "identifier" => {
                if node.id() != reference.id() {
                    return None;
                }
                if !binding.is_root {
                    segments.push(binding.key().to_string());
                }
                break;
            }
            "member_expression" => {
                let property = node.child_by_field_name("property")?;
                if property.kind() != "property_identifier" {
                    return None;
                }
                segments.push(node_text(&property, source).to_string());
                node = node.child_by_field_name("object")?;
            }
            _ => return None,
        }
    }

    segments.reverse();
    Some(segments)
}
