use std::sync::Arc;

use arcstr::ArcStr;

use crate::{ModuleId, ModuleIdx, TransformOutput};

pub struct ModuleTaskResult {
  pub idx: ModuleIdx,
  pub id: ModuleId,
  pub stable_id: String,
  pub source: ArcStr,
  pub source_hash: u128,
  pub transformed: Arc<TransformOutput>,
  /// Resolved path of each entry in `transformed.dependencies`, in the same order.
  pub resolved_deps: Vec<ModuleId>,
}

pub struct PolyfillTaskResult {
  pub slot: usize,
  pub id: ModuleId,
  pub stable_id: String,
  pub source: ArcStr,
  pub transformed: Arc<TransformOutput>,
}
