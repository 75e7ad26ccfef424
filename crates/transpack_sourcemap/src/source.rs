use std::sync::Arc;

use crate::lines_count;

pub trait Source {
  fn content(&self) -> &str;

  fn lines_count(&self) -> u32 {
    lines_count(self.content())
  }

  /// Line level mapping back to an original file, if this source has one.
  fn mapping(&self) -> Option<&LineMapping> {
    None
  }
}

impl Source for &str {
  fn content(&self) -> &str {
    self
  }
}

impl Source for String {
  fn content(&self) -> &str {
    self
  }
}

/// Lines `first_line..first_line + mapped_lines` of a source map one-to-one onto lines
/// `0..mapped_lines` of `source_name`.
#[derive(Debug, Clone)]
pub struct LineMapping {
  pub source_name: String,
  pub source_content: Arc<str>,
  pub first_line: u32,
  pub mapped_lines: u32,
}

#[derive(Debug)]
pub struct SourceMapSource {
  content: String,
  mapping: LineMapping,
}

impl SourceMapSource {
  pub fn new(content: String, mapping: LineMapping) -> Self {
    Self { content, mapping }
  }
}

impl Source for SourceMapSource {
  fn content(&self) -> &str {
    &self.content
  }

  fn mapping(&self) -> Option<&LineMapping> {
    Some(&self.mapping)
  }
}
