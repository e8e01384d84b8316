//! Parser module for mockscope.
//!
//! This module wraps tree-sitter so the rest of the crate can work with a
//! single [`SyntaxTree`] regardless of which JavaScript dialect the source
//! was written in, and builds the [`ScopeTable`] the usage analysis relies on.
//!
//! # Supported Dialects
//!
//! - **JavaScript / JSX** - `tree-sitter-javascript`
//! - **TypeScript** - `tree-sitter-typescript` (`LANGUAGE_TYPESCRIPT`)
//! - **TSX** - `tree-sitter-typescript` (`LANGUAGE_TSX`), the default
//!
//! # Example
//!
//! ```
//! use mockscope::parser::{parse_source, SourceLanguage};
//!
//! let tree = parse_source("const cache = require('cache');", SourceLanguage::JavaScript).unwrap();
//! assert_eq!(tree.root().kind(), "program");
//! ```

pub mod scope;

use std::path::Path;

use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

pub use scope::{ScopeId, ScopeKind, ScopeTable, PROGRAM_SCOPE};

/// Errors that can occur while parsing a source file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The source is not syntactically valid for the chosen dialect.
    #[error("Error parsing file: {message} ({line}:{column})")]
    Syntax {
        message: String,
        /// 1-indexed line of the first error.
        line: usize,
        /// 0-indexed column of the first error.
        column: usize,
    },

    /// tree-sitter gave up without producing a tree.
    #[error("Error parsing file: parser produced no syntax tree")]
    Aborted,

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Language type for source parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceLanguage {
    JavaScript,
    Jsx,
    TypeScript,
    /// TypeScript with JSX; accepts module syntax with both extensions.
    #[default]
    Tsx,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            "jsx" => Some(SourceLanguage::Jsx),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    /// Determine language from a file path, falling back to TSX.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }

    /// Get tree-sitter language for this source language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => {
                tree_sitter_javascript::LANGUAGE.into()
            }
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// A parsed source file: the tree-sitter tree plus the text it indexes into.
pub struct SyntaxTree<'src> {
    tree: Tree,
    source: &'src str,
}

impl<'src> SyntaxTree<'src> {
    /// The `program` node.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The source text the tree was parsed from.
    pub fn source(&self) -> &'src str {
        self.source
    }
}

/// Parse `source` as the given dialect, rejecting any syntax error.
pub fn parse_source(source: &str, language: SourceLanguage) -> ParseResult<SyntaxTree<'_>> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|_| ParseError::LanguageInit)?;

    let tree = parser.parse(source, None).ok_or(ParseError::Aborted)?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(syntax_error(root, source));
    }

    Ok(SyntaxTree { tree, source })
}

/// Describe the first error or missing node in document order.
fn syntax_error(root: Node<'_>, source: &str) -> ParseError {
    let mut node = root;
    loop {
        if node.is_error() || node.is_missing() {
            break;
        }
        let mut cursor = node.walk();
        let next = node
            .children(&mut cursor)
            .find(|child| child.has_error() || child.is_missing());
        match next {
            Some(child) => node = child,
            None => break,
        }
    }

    let position = node.start_position();
    let message = if node.is_missing() {
        format!("Missing {}", node.kind())
    } else {
        let text = node_text(&node, source);
        match text.chars().next() {
            Some(c) => format!("Unexpected token '{}'", first_token(text, c)),
            None => "Unexpected token".to_string(),
        }
    };

    ParseError::Syntax {
        message,
        line: position.row + 1,
        column: position.column,
    }
}

fn first_token(text: &str, first: char) -> &str {
    if first.is_alphanumeric() || first == '_' || first == '$' {
        let end = text
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '$'))
            .map_or(text.len(), |(i, _)| i);
        &text[..end]
    } else {
        &text[..first.len_utf8()]
    }
}

/// Extract the text content of a node.
pub fn node_text<'a>(node: &Node<'_>, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Extract string literal value (removes the surrounding quotes).
pub fn string_value(node: &Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let text = node_text(node, source);
    let mut chars = text.chars();
    let open = chars.next()?;
    let close = chars.next_back()?;
    if open != close || !matches!(open, '"' | '\'') {
        return None;
    }
    Some(unescape(&text[1..text.len() - 1]))
}

/// Decode the escape sequences of a string literal body. Malformed escapes
/// keep their characters as written.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        let digit_follows = chars.peek().is_some_and(|c| c.is_ascii_digit());
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !digit_follows => out.push('\0'),
            // Line continuation.
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            'x' => match hex_escape(&mut chars, false, 2) {
                Some(decoded) => out.push(decoded),
                None => out.push('x'),
            },
            'u' => {
                let braced = chars.next_if_eq(&'{').is_some();
                let decoded = if braced {
                    hex_escape(&mut chars, true, 6)
                } else {
                    hex_escape(&mut chars, false, 4)
                };
                match decoded {
                    Some(decoded) => out.push(decoded),
                    None if braced => out.push_str("u{"),
                    None => out.push('u'),
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Hex digits of an escape: exactly `width` of them, or up to `width`
/// closed by `}` when `braced`. Consumes nothing when malformed.
fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    braced: bool,
    width: usize,
) -> Option<char> {
    let mut lookahead = chars.clone();
    let mut digits = String::new();

    while let Some(c) = lookahead.next_if(|c| c.is_ascii_hexdigit()) {
        digits.push(c);
        if !braced && digits.len() == width {
            break;
        }
    }
    let complete = if braced {
        !digits.is_empty() && digits.len() <= width && lookahead.next_if_eq(&'}').is_some()
    } else {
        digits.len() == width
    };
    if !complete {
        return None;
    }

    let decoded = char::from_u32(u32::from_str_radix(&digits, 16).ok()?)?;
    *chars = lookahead;
    Some(decoded)
}

/// Iterative pre-order walk over a subtree, yielding each node with its depth
/// relative to the starting node.
pub struct Preorder<'tree> {
    cursor: TreeCursor<'tree>,
    depth: usize,
    done: bool,
}

impl<'tree> Preorder<'tree> {
    pub fn new(root: Node<'tree>) -> Self {
        Self {
            cursor: root.walk(),
            depth: 0,
            done: false,
        }
    }
}

impl<'tree> Iterator for Preorder<'tree> {
    type Item = (Node<'tree>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = (self.cursor.node(), self.depth);

        if self.cursor.goto_first_child() {
            self.depth += 1;
        } else {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
                self.depth -= 1;
            }
        }

        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(
            SourceLanguage::from_extension("js"),
            Some(SourceLanguage::JavaScript)
        );
        assert_eq!(
            SourceLanguage::from_extension("CJS"),
            Some(SourceLanguage::JavaScript)
        );
        assert_eq!(SourceLanguage::from_extension("jsx"), Some(SourceLanguage::Jsx));
        assert_eq!(
            SourceLanguage::from_extension("mts"),
            Some(SourceLanguage::TypeScript)
        );
        assert_eq!(SourceLanguage::from_extension("tsx"), Some(SourceLanguage::Tsx));
        assert_eq!(SourceLanguage::from_extension("css"), None);
    }

    #[test]
    fn test_language_from_path_defaults_to_tsx() {
        assert_eq!(
            SourceLanguage::from_path(Path::new("src/api.ts")),
            SourceLanguage::TypeScript
        );
        assert_eq!(SourceLanguage::from_path(Path::new("-")), SourceLanguage::Tsx);
        assert_eq!(
            SourceLanguage::from_path(Path::new("notes.txt")),
            SourceLanguage::Tsx
        );
    }

    #[test]
    fn test_parse_valid_source() {
        let tree = parse_source("import x from 'x';\nx();", SourceLanguage::Tsx).unwrap();
        assert_eq!(tree.root().kind(), "program");
        assert!(!tree.root().has_error());
    }

    #[test]
    fn test_parse_accepts_jsx_and_types() {
        let source = r#"
import React from 'react';
const view = (props: { name: string }) => <div>{props.name}</div>;
"#;
        assert!(parse_source(source, SourceLanguage::Tsx).is_ok());
    }

    #[test]
    fn test_parse_error_reports_position() {
        let err = parse_source("const cache; = require('cache');", SourceLanguage::Tsx)
            .err()
            .unwrap();
        match &err {
            ParseError::Syntax { line, .. } => assert_eq!(*line, 1),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().starts_with("Error parsing file: "));
    }

    #[test]
    fn test_string_value_strips_quotes() {
        let tree = parse_source("import a from \"alpha\";", SourceLanguage::JavaScript).unwrap();
        let import = tree.root().named_child(0).unwrap();
        let source = import.child_by_field_name("source").unwrap();
        assert_eq!(
            string_value(&source, tree.source()),
            Some("alpha".to_string())
        );
    }

    #[test]
    fn test_string_value_decodes_escapes() {
        let source = r#"require('it\'s'); require("a\\b"); require('\x41\u0042\u{43}'); require('tab\tnew\nq\"');"#;
        let tree = parse_source(source, SourceLanguage::JavaScript).unwrap();
        let values: Vec<_> = Preorder::new(tree.root())
            .filter(|(node, _)| node.kind() == "string")
            .filter_map(|(node, _)| string_value(&node, tree.source()))
            .collect();
        assert_eq!(values, vec!["it's", "a\\b", "ABC", "tab\tnew\nq\""]);
    }

    #[test]
    fn test_unescape_keeps_malformed_escapes() {
        assert_eq!(unescape(r"\xZ1"), "xZ1");
        assert_eq!(unescape(r"\u12"), "u12");
        assert_eq!(unescape(r"\q"), "q");
        assert_eq!(unescape(r"\0"), "\0");
        assert_eq!(unescape(r"\u{41"), "u{41");
        assert_eq!(unescape(r"\x+1"), "x+1");
    }

    #[test]
    fn test_preorder_visits_every_node_in_order() {
        let tree = parse_source("a.b();", SourceLanguage::JavaScript).unwrap();
        let kinds: Vec<_> = Preorder::new(tree.root())
            .filter(|(node, _)| node.is_named())
            .map(|(node, _)| node.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "program",
                "expression_statement",
                "call_expression",
                "member_expression",
                "identifier",
                "property_identifier",
                "arguments"
            ]
        );
    }

    #[test]
    fn test_preorder_depth() {
        let tree = parse_source("a();", SourceLanguage::JavaScript).unwrap();
        let depths: Vec<_> = Preorder::new(tree.root())
            .filter(|(node, _)| node.kind() == "identifier" || node.kind() == "program")
            .map(|(_, depth)| depth)
            .collect();
        assert_eq!(depths, vec![0, 3]);
    }
}
