use anyhow::bail;
use transpack_common::{Module, ModuleIdx, SourceSpan};

/// Replaces every dependency specifier literal in the transformed code by the numeric ID of the
/// module it resolved to. The ID is right-padded with spaces to the literal's length so that
/// every other token keeps its line and column. An ID longer than its literal (`require('a')`
/// resolving to ID 1000) is written in full and shifts the columns after it on that line.
/// Lines never move.
pub fn rewrite_dependencies(module: &Module) -> anyhow::Result<String> {
  let code = module.code();
  let mut replacements = module
    .dependencies
    .iter()
    .flat_map(|dep| dep.spans.iter().map(|span| (*span, dep.target)))
    .collect::<Vec<(SourceSpan, ModuleIdx)>>();

  if replacements.is_empty() {
    return Ok(code.to_string());
  }
  replacements.sort_unstable_by_key(|(span, _)| span.start);

  let mut buffer = itoa::Buffer::new();
  let mut rewritten = String::with_capacity(code.len());
  let mut last = 0;

  for (span, target) in replacements {
    let range = span.range();
    if range.start < last || range.end > code.len() {
      bail!("Dependency span {}..{} is out of bounds or overlapping", span.start, span.end);
    }
    if !code.is_char_boundary(range.start) || !code.is_char_boundary(range.end) {
      bail!("Dependency span {}..{} does not fall on character boundaries", span.start, span.end);
    }

    rewritten.push_str(&code[last..range.start]);
    let id = buffer.format(target.index());
    rewritten.push_str(id);
    for _ in id.len()..range.len() {
      rewritten.push(' ');
    }
    last = range.end;
  }

  rewritten.push_str(&code[last..]);
  Ok(rewritten)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use arcstr::ArcStr;
  use transpack_common::{
    Module, ModuleFlags, ModuleId, ModuleIdx, ResolvedDependency, SourceSpan, TransformOutput,
  };

  use super::rewrite_dependencies;

  fn module(code: &str, dependencies: Vec<ResolvedDependency>) -> Module {
    Module {
      idx: ModuleIdx::new(0),
      id: ModuleId::new("/root/index.js"),
      stable_id: "index.js".to_string(),
      source: ArcStr::from(code),
      source_hash: 0,
      transformed: Arc::new(TransformOutput { code: code.to_string(), dependencies: vec![] }),
      dependencies,
      flags: ModuleFlags::ENTRY,
    }
  }

  fn dependency(target: usize, spans: &[(u32, u32)]) -> ResolvedDependency {
    ResolvedDependency {
      specifier: String::new(),
      spans: spans.iter().map(|(start, end)| SourceSpan::new(*start, *end)).collect(),
      target: ModuleIdx::new(target),
    }
  }

  #[test]
  fn keeps_columns_stable() {
    let code = "const a = require('./a');\nconst b = require(\"./b\"), c = require('./a');";
    let module =
      module(code, vec![dependency(3, &[(18, 23), (64, 69)]), dependency(12, &[(44, 49)])]);

    let rewritten = rewrite_dependencies(&module).unwrap();
    assert_eq!(
      rewritten,
      "const a = require(3    );\nconst b = require(12   ), c = require(3    );"
    );
    assert_eq!(rewritten.len(), code.len());
  }

  #[test]
  fn long_ids_grow_their_line_only() {
    let code = "const a = require('a');\nconst b = 1;";
    let module = module(code, vec![dependency(1000, &[(18, 21)])]);

    let rewritten = rewrite_dependencies(&module).unwrap();
    assert_eq!(rewritten, "const a = require(1000);\nconst b = 1;");
    assert_eq!(rewritten.len(), code.len() + 1);
    assert_eq!(rewritten.lines().count(), code.lines().count());
  }

  #[test]
  fn rejects_spans_outside_of_the_code() {
    let module = module("require('./a');", vec![dependency(0, &[(8, 40)])]);
    assert!(rewrite_dependencies(&module).is_err());
  }
}
