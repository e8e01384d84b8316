//! JSON export implementation.
//!
//! Exports mock shapes as a JSON object keyed by module path, for tooling that
//! wants the inferred shape rather than Jest source. Stubs are `null`,
//! automocked modules are the string `"automock"`. The layout matches
//! `serde_json`'s pretty printer; objects are written from an explicit stack
//! so deep trees do not recurse.

use super::{Exporter, MockStatement};
use crate::mock::{MockNode, MockTree};
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

const INDENT: &str = "  ";

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, statements: &[MockStatement], writer: &mut W) -> io::Result<()> {
        if statements.is_empty() {
            return writer.write_all(b"{}");
        }

        writer.write_all(b"{")?;
        for (i, statement) in statements.iter().enumerate() {
            if i > 0 {
                writer.write_all(b",")?;
            }
            write!(writer, "\n{}{}: ", INDENT, json_string(&statement.module_path)?)?;
            match &statement.factory {
                None => writer.write_all(b"\"automock\"")?,
                Some(MockTree::Leaf) => writer.write_all(b"null")?,
                Some(MockTree::Node(node)) => write_object(node, 1, writer)?,
            }
        }
        writer.write_all(b"\n}")
    }
}

/// Write `root` as a pretty-printed object whose opening brace sits at
/// `depth` levels of indentation.
fn write_object<W: Write>(root: &MockNode, depth: usize, writer: &mut W) -> io::Result<()> {
    struct Frame<I> {
        children: I,
        depth: usize,
        first: bool,
    }

    writer.write_all(b"{")?;
    let mut stack = vec![Frame {
        children: root.iter(),
        depth: depth + 1,
        first: true,
    }];

    while let Some(frame) = stack.last_mut() {
        let depth = frame.depth;
        match frame.children.next() {
            Some((key, value)) => {
                if !frame.first {
                    writer.write_all(b",")?;
                }
                frame.first = false;
                write!(writer, "\n{}{}: ", INDENT.repeat(depth), json_string(key)?)?;
                match value {
                    MockTree::Leaf => writer.write_all(b"null")?,
                    MockTree::Node(child) => {
                        writer.write_all(b"{")?;
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
                write!(writer, "\n{}}}", INDENT.repeat(depth - 1))?;
            }
        }
    }

    Ok(())
}

/// A quoted, escaped JSON string.
fn json_string(value: &str) -> io::Result<String> {
    Ok(serde_json::to_string(value)?)
}
