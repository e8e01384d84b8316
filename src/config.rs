//! Module filters and mock mode.
//!
//! [`MockOptions`] can be built in code, or loaded from a TOML file:
//!
//! ```toml
//! exclude = ["react", "./styles.css"]
//! include = []
//! automock = false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading options.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which modules get a mock registration, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockOptions {
    /// Module paths to skip entirely.
    pub exclude: Vec<String>,
    /// When non-empty, only these module paths are processed.
    pub include: Vec<String>,
    /// Register modules without a factory instead of inferring their shape.
    pub automock: bool,
}

impl MockOptions {
    /// Create options that process every module with shape inference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_exclude<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(modules.into_iter().map(Into::into));
        self
    }

    pub fn with_include<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(modules.into_iter().map(Into::into));
        self
    }

    pub fn with_automock(mut self, automock: bool) -> Self {
        self.automock = automock;
        self
    }

    /// Returns true if `module_path` passes the filters. Exclusion wins over
    /// inclusion.
    pub fn allows(&self, module_path: &str) -> bool {
        if self.exclude.iter().any(|m| m == module_path) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|m| m == module_path)
    }
}
