use std::sync::Arc;

use arcstr::ArcStr;
use bitflags::bitflags;

use crate::{ModuleId, ModuleIdx, SourceSpan, TransformOutput};

bitflags! {
  #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
  pub struct ModuleFlags: u8 {
    const ENTRY = 1;
    const RUN_BEFORE_MAIN = 1 << 1;
  }
}

/// Dependency edge `(importer, specifier, target)`.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
  pub specifier: String,
  pub spans: Vec<SourceSpan>,
  pub target: ModuleIdx,
}

#[derive(Debug)]
pub struct Module {
  pub idx: ModuleIdx,
  pub id: ModuleId,
  /// `stable_id` is calculated based on `id` to be stable across machine and os.
  pub stable_id: String,
  pub source: ArcStr,
  pub source_hash: u128,
  pub transformed: Arc<TransformOutput>,
  pub dependencies: Vec<ResolvedDependency>,
  pub flags: ModuleFlags,
}

impl Module {
  pub fn code(&self) -> &str {
    &self.transformed.code
  }

  pub fn is_entry(&self) -> bool {
    self.flags.contains(ModuleFlags::ENTRY)
  }

  /// Targets of all dependencies, in specifier order, duplicates removed.
  pub fn dependency_ids(&self) -> Vec<ModuleIdx> {
    let mut ids = Vec::with_capacity(self.dependencies.len());
    for dep in &self.dependencies {
      if !ids.contains(&dep.target) {
        ids.push(dep.target);
      }
    }
    ids
  }
}

/// A script that is always included and executed before every application module. Polyfills
/// live outside the numeric module ID space and their dependencies are not followed.
#[derive(Debug)]
pub struct Polyfill {
  pub id: ModuleId,
  pub stable_id: String,
  pub source: ArcStr,
  pub transformed: Arc<TransformOutput>,
}
