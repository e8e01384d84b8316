//! Per-module mock entries for one source file.

use super::tree::MockTree;

/// What gets registered for a single module path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    /// Register the module without a factory and let the test runner
    /// generate the mock.
    Automock,
    /// Register the module with a factory producing this shape.
    Factory(MockTree),
}

/// Module path (as written in the source) to its merged mock entry, in the
/// order modules were first discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleMockTable {
    entries: Vec<(String, MockEntry)>,
}

impl ModuleMockTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one access path into the module's tree.
    ///
    /// Automocked modules ignore usage paths.
    pub fn record_path<S: AsRef<str>>(&mut self, module_path: &str, path: &[S]) {
        match self.position(module_path) {
            Some(index) => {
                if let MockEntry::Factory(tree) = &mut self.entries[index].1 {
                    tree.insert_path(path);
                }
            }
            None => self.entries.push((
                module_path.to_string(),
                MockEntry::Factory(MockTree::from_path(path)),
            )),
        }
    }

    /// Mark the module as automocked, discarding any recorded shape.
    pub fn record_automock(&mut self, module_path: &str) {
        match self.position(module_path) {
            Some(index) => self.entries[index].1 = MockEntry::Automock,
            None => self
                .entries
                .push((module_path.to_string(), MockEntry::Automock)),
        }
    }

    /// Merge another table into this one.
    pub fn merge(&mut self, other: &ModuleMockTable) {
        for (module_path, entry) in other.iter() {
            match entry {
                MockEntry::Automock => self.record_automock(module_path),
                MockEntry::Factory(tree) => {
                    for path in tree.leaf_paths() {
                        self.record_path(module_path, path.as_slice());
                    }
                }
            }
        }
    }

    pub fn get(&self, module_path: &str) -> Option<&MockEntry> {
        self.position(module_path).map(|index| &self.entries[index].1)
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MockEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, module_path: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == module_path)
    }
}

impl IntoIterator for ModuleMockTable {
    type Item = (String, MockEntry);
    type IntoIter = std::vec::IntoIter<(String, MockEntry)>;

    /// Entries in discovery order, by value.
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
