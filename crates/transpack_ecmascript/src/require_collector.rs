use anyhow::bail;
use oxc::{
  allocator::Allocator,
  ast::ast::{Argument, CallExpression, Expression},
  ast_visit::{walk, Visit},
  parser::Parser,
  span::SourceType,
};
use transpack_common::{Dependency, SourceSpan};
use transpack_utils::collections::FxIndexMap;

/// Parses `source` and returns every `require("…")` specifier, in order of first appearance,
/// with the spans of all of its string literals.
///
/// Calls to `require` with anything but a single string literal are rejected, the bundle
/// could not map them to a module ID.
pub fn collect_requires(source: &str, source_type: SourceType) -> anyhow::Result<Vec<Dependency>> {
  let allocator = Allocator::default();
  let ret = Parser::new(&allocator, source, source_type).parse();
  if ret.panicked || !ret.errors.is_empty() {
    let messages = ret.errors.iter().map(ToString::to_string).collect::<Vec<_>>();
    bail!("Syntax error: {}", messages.join("; "));
  }

  let mut collector = RequireCollector::default();
  collector.visit_program(&ret.program);

  if let Some(span) = collector.dynamic_requires.first() {
    let snippet = source.get(span.range()).unwrap_or_default();
    bail!("Invalid call `{snippet}` at offset {}: require() only accepts a string literal", span.start);
  }

  Ok(
    collector
      .dependencies
      .into_iter()
      .map(|(specifier, spans)| Dependency::new(specifier, spans))
      .collect(),
  )
}

#[derive(Default)]
struct RequireCollector {
  dependencies: FxIndexMap<String, Vec<SourceSpan>>,
  dynamic_requires: Vec<SourceSpan>,
}

impl<'a> Visit<'a> for RequireCollector {
  fn visit_call_expression(&mut self, expr: &CallExpression<'a>) {
    if matches!(&expr.callee, Expression::Identifier(callee) if callee.name.as_str() == "require") {
      match expr.arguments.as_slice() {
        [Argument::StringLiteral(request)] => {
          self
            .dependencies
            .entry(request.value.to_string())
            .or_default()
            .push(SourceSpan::new(request.span.start, request.span.end));
        }
        _ => {
          self.dynamic_requires.push(SourceSpan::new(expr.span.start, expr.span.end));
        }
      }
    }
    walk::walk_call_expression(self, expr);
  }
}

#[test]
fn collects_require_calls_in_order() {
  let source = r#"
    const a = require("./a");
    const b = require('./b');
    function lazy() { return require("./a"); }
  "#;
  let deps = collect_requires(source, SourceType::cjs()).unwrap();

  assert_eq!(deps.iter().map(|dep| dep.specifier.as_str()).collect::<Vec<_>>(), ["./a", "./b"]);
  assert_eq!(deps[0].spans.len(), 2);
  for span in &deps[0].spans {
    assert_eq!(&source[span.range()], r#""./a""#);
  }
  assert_eq!(&source[deps[1].spans[0].range()], "'./b'");
}

#[test]
fn rejects_dynamic_requires() {
  let err = collect_requires("const name = './a'; require(name);", SourceType::cjs()).unwrap_err();
  assert!(err.to_string().starts_with("Invalid call `require(name)`"));
}

#[test]
fn reports_syntax_errors() {
  let err = collect_requires("const = ;", SourceType::cjs()).unwrap_err();
  assert!(err.to_string().starts_with("Syntax error"));
}
