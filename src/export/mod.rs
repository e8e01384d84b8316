//! Rendering of mock registrations.
//!
//! The analysis produces a [`ModuleMockTable`]; this module turns it into a
//! list of [`MockStatement`]s and renders them as Jest source or JSON.

pub mod jest;
pub mod json;

use crate::mock::{MockEntry, MockTree, ModuleMockTable};
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// `jest.mock(...)` statements, ready to paste into a test file
    #[default]
    Jest,
    /// JSON format - machine-readable mock shapes
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jest" | "js" => Ok(ExportFormat::Jest),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: jest, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Jest => write!(f, "jest"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// One mock registration: `register(module_path, factory)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStatement {
    pub module_path: String,
    /// `None` registers the module without a factory (automock).
    pub factory: Option<MockTree>,
}

impl MockStatement {
    /// Build one statement per table entry, in discovery order. The trees are
    /// moved out of the table.
    pub fn from_table(table: ModuleMockTable) -> Vec<MockStatement> {
        table
            .into_iter()
            .map(|(module_path, entry)| MockStatement {
                module_path,
                factory: match entry {
                    MockEntry::Automock => None,
                    MockEntry::Factory(tree) => Some(tree),
                },
            })
            .collect()
    }

    /// Returns true if the statement registers an automock.
    pub fn is_automock(&self) -> bool {
        self.factory.is_none()
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the statements to the given writer.
    fn export<W: Write>(&self, statements: &[MockStatement], writer: &mut W) -> io::Result<()>;
}

/// Export statements in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    statements: &[MockStatement],
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Jest => jest::JestExporter.export(statements, writer),
        ExportFormat::Json => json::JsonExporter.export(statements, writer),
    }
}

/// Export statements to a string.
pub fn export_to_string(format: ExportFormat, statements: &[MockStatement]) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, statements, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
