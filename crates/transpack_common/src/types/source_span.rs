use serde::{Deserialize, Serialize};

/// Byte range `start..end` inside a module's transformed code.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
  pub start: u32,
  pub end: u32,
}

impl SourceSpan {
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }

  pub fn len(self) -> usize {
    (self.end - self.start) as usize
  }

  pub fn is_empty(self) -> bool {
    self.start >= self.end
  }

  pub fn range(self) -> std::ops::Range<usize> {
    self.start as usize..self.end as usize
  }
}
