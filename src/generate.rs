//! End-to-end mock generation for one source file.
//!
//! source → [`parse_source`] → [`ScopeTable`] → [`classify_imports`] →
//! [`call_paths`] → [`ModuleMockTable`] → [`MockStatement`]s → text.

use thiserror::Error;
use tracing::debug;

use crate::analysis::{call_paths, classify_imports};
use crate::config::MockOptions;
use crate::export::{export_to_string, ExportFormat, MockStatement};
use crate::mock::ModuleMockTable;
use crate::parser::{parse_source, ParseError, ScopeTable, SourceLanguage, SyntaxTree};

/// Errors that can occur while generating mocks.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// No source text was provided.
    #[error("file is required")]
    InputMissing,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to render output: {0}")]
    Render(#[from] std::io::Error),
}

/// Result type for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Generate `jest.mock()` registrations for a TSX-compatible source file.
///
/// ```
/// use mockscope::{generate, MockOptions};
///
/// let output = generate(
///     "const cache = require('cache');\ncache.set('foo', 'bar');",
///     &MockOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(output, "jest.mock('cache', () => ({\n  set: jest.fn()\n}));");
/// ```
pub fn generate(source: &str, options: &MockOptions) -> GenerateResult<String> {
    generate_with(source, SourceLanguage::default(), options, ExportFormat::Jest)
}

/// Generate mocks for `source` parsed as `language`, rendered as `format`.
pub fn generate_with(
    source: &str,
    language: SourceLanguage,
    options: &MockOptions,
    format: ExportFormat,
) -> GenerateResult<String> {
    let statements = collect_mocks(source, language, options)?;
    Ok(export_to_string(format, &statements)?)
}

/// Build the structured mock registrations for `source` without rendering.
pub fn collect_mocks(
    source: &str,
    language: SourceLanguage,
    options: &MockOptions,
) -> GenerateResult<Vec<MockStatement>> {
    if source.is_empty() {
        return Err(GenerateError::InputMissing);
    }

    let tree = parse_source(source, language)?;
    let scopes = ScopeTable::build(tree.root(), tree.source());
    debug!("Parsed {} bytes as {:?}: {} scopes", source.len(), language, scopes.len());

    let table = build_mock_table(&tree, &scopes, options);
    debug!("Mock table has {} modules", table.len());

    Ok(MockStatement::from_table(table))
}

/// Classify every import, trace its bindings and merge the call paths per
/// module, honoring the module filters and automock mode.
pub fn build_mock_table(
    tree: &SyntaxTree<'_>,
    scopes: &ScopeTable<'_>,
    options: &MockOptions,
) -> ModuleMockTable {
    let mut table = ModuleMockTable::new();

    for import in classify_imports(tree, scopes) {
        if !options.allows(&import.module_path) {
            debug!("Skipping filtered module '{}'", import.module_path);
            continue;
        }
        if options.automock {
            table.record_automock(&import.module_path);
            continue;
        }
        for binding in &import.bindings {
            let paths = call_paths(binding, import.scope, scopes, tree.source());
            debug!(
                "'{}' from '{}' (line {}): {} call paths",
                binding.local_name,
                binding.module_path,
                import.line,
                paths.len()
            );
            for path in paths {
                table.record_path(&binding.module_path, path.as_slice());
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> String {
        generate(source, &MockOptions::default()).unwrap()
    }

    fn run_with(source: &str, options: MockOptions) -> String {
        generate(source, &options).unwrap()
    }

    // ===== Usage Shapes =====

    #[test]
    fn test_object_properties() {
        let result = run("
      const cache = require('cache');
      cache.set('foo', 'bar');
    ");
        assert_eq!(result, "jest.mock('cache', () => ({\n  set: jest.fn()\n}));");
    }

    #[test]
    fn test_destructured_require() {
        let result = run("
      const {set} = require('cache');
      set('foo', 'bar');
    ");
        assert_eq!(result, "jest.mock('cache', () => ({\n  set: jest.fn()\n}));");
    }

    #[test]
    fn test_named_import() {
        let result = run("
      import {set} from 'cache';
      set('foo', 'bar');
    ");
        assert_eq!(result, "jest.mock('cache', () => ({\n  set: jest.fn()\n}));");
    }

    #[test]
    fn test_named_and_default_import() {
        let result = run("
      import cache, {set} from 'cache';
      set('foo', 'bar');
      cache.flush();
    ");
        let expected = "\
jest.mock('cache', () => ({
  default: {
    flush: jest.fn()
  },
  set: jest.fn()
}));";
        assert_eq!(result, expected);
    }

    #[test]
    fn test_nested_properties() {
        let result = run("
      const api = require('api');
      api.users.create();
      api.users.delete();
      api.post.create();
      api.post.comments.create();
      api.version();
    ");
        let expected = "\
jest.mock('api', () => ({
  users: {
    create: jest.fn(),
    delete: jest.fn()
  },
  post: {
    create: jest.fn(),
    comments: {
      create: jest.fn()
    }
  },
  version: jest.fn()
}));";
        assert_eq!(result, expected);
    }

    #[test]
    fn test_commonjs_default_function() {
        let result = run("
      const track = require('track');
      track('event');
    ");
        assert_eq!(result, "jest.mock('track', () => jest.fn());");
    }

    #[test]
    fn test_es6_default_function() {
        let result = run("
      import track from 'track';
      track('event');
    ");
        assert_eq!(result, "jest.mock('track', () => ({\n  default: jest.fn()\n}));");
    }

    #[test]
    fn test_calls_in_methods() {
        let result = run("
      const cache = require('cache');
      function main() {
        cache.set('foo', 'bar');
      }
    ");
        assert_eq!(result, "jest.mock('cache', () => ({\n  set: jest.fn()\n}));");
    }

    #[test]
    fn test_calls_in_nested_methods() {
        let result = run("
      const cache = require('cache');
      function main() {
        function nested() {
          cache.set('foo', 'bar');
        }
      }
    ");
        assert_eq!(result, "jest.mock('cache', () => ({\n  set: jest.fn()\n}));");
    }

    #[test]
    fn test_leaf_refined_by_deeper_usage() {
        let result = run("
      const api = require('api');
      api.users();
      api.users.list();
    ");
        assert_eq!(
            result,
            "jest.mock('api', () => ({\n  users: {\n    list: jest.fn()\n  }\n}));"
        );
    }

    #[test]
    fn test_multiple_modules_in_source_order() {
        let result = run("
      import React from 'react';
      const track = require('track');
      import { get } from 'axios';
      track('load');
      get('/users');
    ");
        assert_eq!(
            result,
            "jest.mock('track', () => jest.fn());\njest.mock('axios', () => ({\n  get: jest.fn()\n}));"
        );
    }

    #[test]
    fn test_typescript_and_jsx_source() {
        let result = run("
      import { format } from 'date-fns';
      export const Label = ({ at }: { at: Date }) => <span>{format(at, 'PP')}</span>;
    ");
        assert_eq!(result, "jest.mock('date-fns', () => ({\n  format: jest.fn()\n}));");
    }

    // ===== No Output =====

    #[test]
    fn test_require_without_assignment() {
        assert_eq!(run("\n      require('cache');\n    "), "");
    }

    #[test]
    fn test_import_without_assignment() {
        assert_eq!(run("\n      import 'cache';\n    "), "");
    }

    #[test]
    fn test_loop_variable_shadows_import() {
        assert_eq!(
            run("import item from 'item';\nfor (const item of list) { item.save(); }"),
            ""
        );
        assert_eq!(
            run("const api = require('api');\nfor (let api in obj) { api.x(); }"),
            ""
        );
    }

    #[test]
    fn test_loop_over_import_is_still_tracked() {
        let result = run("
      import { load } from 'rows';
      for (const row of load()) {
        row.save();
      }
    ");
        assert_eq!(result, "jest.mock('rows', () => ({\n  load: jest.fn()\n}));");
    }

    #[test]
    fn test_escaped_module_path() {
        let result = run("const quote = require('it\\'s');\nquote();");
        assert_eq!(result, "jest.mock('it\\'s', () => jest.fn());");
    }

    #[test]
    fn test_imported_but_never_called() {
        assert_eq!(run("import cache from 'cache';\nexport default cache;"), "");
    }

    // ===== Filters =====

    #[test]
    fn test_exclude() {
        let source = "
      const cache = require('cache');
      const track = require('track');
      cache.set();
      track();
    ";
        let result = run_with(source, MockOptions::new().with_exclude(["cache"]));
        assert_eq!(result, "jest.mock('track', () => jest.fn());");
    }

    #[test]
    fn test_include() {
        let source = "
      const cache = require('cache');
      const track = require('track');
      cache.set();
      track();
    ";
        let result = run_with(source, MockOptions::new().with_include(["cache"]));
        assert_eq!(result, "jest.mock('cache', () => ({\n  set: jest.fn()\n}));");
    }

    #[test]
    fn test_exclude_takes_precedence() {
        let source = "const cache = require('cache');\ncache.set();";
        let options = MockOptions::new()
            .with_include(["cache"])
            .with_exclude(["cache"]);
        assert_eq!(run_with(source, options), "");
    }

    #[test]
    fn test_automock() {
        let source = "
      import cache, { set } from 'cache';
      const api = require('api');
      import './setup';
      set();
      api.users.create();
    ";
        let result = run_with(source, MockOptions::new().with_automock(true));
        assert_eq!(
            result,
            "jest.mock('cache');\njest.mock('api');\njest.mock('./setup');"
        );
    }

    #[test]
    fn test_automock_registers_bare_require() {
        let source = "require('./polyfills');\nconst api = require('api');";
        let result = run_with(source, MockOptions::new().with_automock(true));
        assert_eq!(result, "jest.mock('./polyfills');\njest.mock('api');");
    }

    #[test]
    fn test_automock_respects_filters() {
        let source = "import a from 'a';\nimport b from 'b';";
        let options = MockOptions::new().with_automock(true).with_exclude(["a"]);
        assert_eq!(run_with(source, options), "jest.mock('b');");
    }

    // ===== Errors =====

    #[test]
    fn test_empty_input() {
        let err = generate("", &MockOptions::default()).unwrap_err();
        assert!(matches!(err, GenerateError::InputMissing));
        assert_eq!(err.to_string(), "file is required");
    }

    #[test]
    fn test_parse_error() {
        let err = generate("const cache; = require('cache');", &MockOptions::default()).unwrap_err();
        assert!(matches!(err, GenerateError::Parse(_)));
        assert!(err.to_string().starts_with("Error parsing file: "));
    }

    // ===== Structured Output =====

    #[test]
    fn test_collect_mocks() {
        let statements = collect_mocks(
            "const track = require('track');\ntrack();",
            SourceLanguage::JavaScript,
            &MockOptions::default(),
        )
        .unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].module_path, "track");
        assert_eq!(statements[0].factory, Some(crate::mock::MockTree::Leaf));
    }

    #[test]
    fn test_json_format() {
        let output = generate_with(
            "import { get } from 'axios';\nget();",
            SourceLanguage::TypeScript,
            &MockOptions::default(),
            ExportFormat::Json,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed["axios"]["get"].is_null());
        assert!(parsed["axios"].as_object().unwrap().contains_key("get"));
    }

    fn member_chain(depth: usize) -> (String, Vec<String>) {
        let segments: Vec<String> = (0..depth).map(|i| format!("p{}", i)).collect();
        let source = format!("const a = require('a');\na.{}();", segments.join("."));
        (source, segments)
    }

    #[test]
    fn test_deep_member_chain_is_collected() {
        let (source, segments) = member_chain(50_000);
        let statements =
            collect_mocks(&source, SourceLanguage::JavaScript, &MockOptions::default()).unwrap();

        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].factory,
            Some(crate::mock::MockTree::from_path(segments.as_slice()))
        );
    }

    #[test]
    fn test_deep_member_chain_renders_in_both_formats() {
        let (source, _) = member_chain(5_000);
        let options = MockOptions::default();

        let jest = generate_with(&source, SourceLanguage::JavaScript, &options, ExportFormat::Jest)
            .unwrap();
        assert!(jest.starts_with("jest.mock('a', () => ({\n  p0: {\n    p1: {"));
        assert!(jest.contains("p4999: jest.fn()\n"));
        assert!(jest.ends_with("}));"));
        assert_eq!(jest.matches("jest.fn()").count(), 1);

        let json = generate_with(&source, SourceLanguage::JavaScript, &options, ExportFormat::Json)
            .unwrap();
        assert!(json.starts_with("{\n  \"a\": {\n    \"p0\": {"));
        assert!(json.ends_with("}\n}"));
        assert_eq!(json.matches("null").count(), 1);
    }

    #[test]
    fn test_discovery_order_does_not_change_shape() {
        let forward = collect_mocks(
            "const api = require('api');\napi.a.x();\napi.b();\napi.a();",
            SourceLanguage::JavaScript,
            &MockOptions::default(),
        )
        .unwrap();
        let backward = collect_mocks(
            "const api = require('api');\napi.a();\napi.b();\napi.a.x();",
            SourceLanguage::JavaScript,
            &MockOptions::default(),
        )
        .unwrap();
        assert_eq!(forward, backward);
    }
}
