//! MockScope - infer `jest.mock()` registrations from how a file uses its imports
//!
//! This crate parses a JavaScript or TypeScript source file, follows every
//! imported or required binding through its scope, and records which members
//! of the module are actually called. The recorded call paths are merged into
//! one mock shape per module and rendered as Jest source.
//!
//! ```
//! use mockscope::{generate, MockOptions};
//!
//! let source = "import { get } from 'axios';\nget('/users');";
//! let output = generate(source, &MockOptions::default()).unwrap();
//! assert_eq!(output, "jest.mock('axios', () => ({\n  get: jest.fn()\n}));");
//! ```

pub mod analysis;
pub mod config;
pub mod export;
pub mod generate;
pub mod mock;
pub mod parser;

pub use config::MockOptions;
pub use generate::{collect_mocks, generate, generate_with, GenerateError, GenerateResult};
