use oxc_sourcemap::{SourceMap, SourceMapBuilder};

use crate::Source;

#[derive(Debug)]
pub struct JoinedSource {
  pub code: String,
  pub map: Option<SourceMap>,
}

/// Concatenates sources with a `\n` between each of them and, optionally, collects their
/// line mappings into one source map.
#[derive(Default)]
pub struct SourceJoiner<'source> {
  inner: Vec<Box<dyn Source + Send + 'source>>,
  enable_sourcemap: bool,
}

impl<'source> SourceJoiner<'source> {
  pub fn new(enable_sourcemap: bool) -> Self {
    Self { inner: Vec::new(), enable_sourcemap }
  }

  pub fn append_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.inner.push(Box::new(source));
  }

  pub fn join(&self) -> JoinedSource {
    if self.inner.is_empty() {
      return JoinedSource { code: String::new(), map: None };
    }

    let size_hint = self.inner.iter().map(|source| source.content().len()).sum::<usize>()
      + /* Each source we will emit a '\n' but exclude last one */ (self.inner.len() - 1);
    let mut code = String::with_capacity(size_hint);
    let mut builder = self.enable_sourcemap.then(SourceMapBuilder::default);
    let mut line_offset = 0;

    for (index, source) in self.inner.iter().enumerate() {
      if index > 0 {
        code.push('\n');
      }
      code.push_str(source.content());

      if let (Some(builder), Some(mapping)) = (builder.as_mut(), source.mapping()) {
        let source_id =
          builder.add_source_and_content(&mapping.source_name, &mapping.source_content);
        for line in 0..mapping.mapped_lines {
          builder.add_token(line_offset + mapping.first_line + line, 0, line, 0, Some(source_id), None);
        }
      }

      line_offset += source.lines_count() + 1;
    }

    JoinedSource { code, map: builder.map(SourceMapBuilder::into_sourcemap) }
  }
}

#[test]
fn joins_with_newlines() {
  let mut joiner = SourceJoiner::new(false);
  joiner.append_source("var a = 1;");
  joiner.append_source(String::from("var b = 2;\nvar c = 3;"));

  let joined = joiner.join();
  assert_eq!(joined.code, "var a = 1;\nvar b = 2;\nvar c = 3;");
  assert!(joined.map.is_none());
}

#[test]
fn maps_lines_of_wrapped_sources() {
  use std::sync::Arc;

  use crate::{LineMapping, SourceMapSource};

  let mut joiner = SourceJoiner::new(true);
  joiner.append_source("// prelude");
  joiner.append_source(SourceMapSource::new(
    "__d(function () {\nfoo();\nbar();\n}, 0);".to_string(),
    LineMapping {
      source_name: "src/a.js".to_string(),
      source_content: Arc::from("foo();\nbar();"),
      first_line: 1,
      mapped_lines: 2,
    },
  ));

  let joined = joiner.join();
  assert_eq!(joined.code.lines().count(), 5);
  let json = joined.map.unwrap().to_json_string();
  assert!(json.contains(r#""sources":["src/a.js"]"#));
  assert!(json.contains("foo();\\nbar();"));
}
