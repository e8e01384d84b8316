//! Jest export implementation.
//!
//! Renders one `jest.mock()` call per statement, laid out the way Babel's
//! generator prints them:
//!
//! ```text
//! jest.mock('api', () => ({
//!   users: {
//!     create: jest.fn()
//!   },
//!   version: jest.fn()
//! }));
//! ```

use super::{Exporter, MockStatement};
use crate::mock::{MockNode, MockTree};
use std::io::{self, Write};

/// Jest exporter implementation.
pub struct JestExporter;

const STUB: &str = "jest.fn()";
const INDENT: &str = "  ";

impl Exporter for JestExporter {
    fn export<W: Write>(&self, statements: &[MockStatement], writer: &mut W) -> io::Result<()> {
        let rendered: Vec<String> = statements.iter().map(render_statement).collect();
        write!(writer, "{}", rendered.join("\n"))
    }
}

/// Render a single statement.
pub fn render_statement(statement: &MockStatement) -> String {
    let module = quote(&statement.module_path);
    match &statement.factory {
        None => format!("jest.mock({});", module),
        Some(MockTree::Leaf) => format!("jest.mock({}, () => {});", module, STUB),
        Some(MockTree::Node(node)) => {
            format!("jest.mock({}, () => ({}));", module, render_object(node))
        }
    }
}

/// Render a node as a multi-line object literal.
pub fn render_object(root: &MockNode) -> String {
    struct Frame<I> {
        children: I,
        depth: usize,
        first: bool,
    }

    let mut out = String::from("{");
    let mut stack = vec![Frame {
        children: root.iter(),
        depth: 1,
        first: true,
    }];

    while let Some(frame) = stack.last_mut() {
        let depth = frame.depth;
        match frame.children.next() {
            Some((key, value)) => {
                if !frame.first {
                    out.push(',');
                }
                frame.first = false;
                out.push('\n');
                out.push_str(&INDENT.repeat(depth));
                out.push_str(&property_key(key));
                out.push_str(": ");
                match value {
                    MockTree::Leaf => out.push_str(STUB),
                    MockTree::Node(child) => {
                        out.push('{');
                        stack.push(Frame {
                            children: child.iter(),
                            depth: depth + 1,
                            first: true,
                        });
                    }
                }
            }
            None => {
                stack.pop();
                out.push('\n');
                out.push_str(&INDENT.repeat(depth - 1));
                out.push('}');
            }
        }
    }

    out
}

/// A property key: bare when it is a valid identifier name, quoted otherwise.
fn property_key(key: &str) -> String {
    if is_identifier_name(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

/// Single-quoted JavaScript string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
