use std::sync::Arc;

use arcstr::ArcStr;
use tracing::trace;
use transpack_common::{ModuleId, ModuleIdx, ModuleLoaderMsg, ModuleTaskResult, PolyfillTaskResult};
use transpack_error::{BuildError, BuildResult};
use transpack_fs::FileSystem;

use super::task_context::TaskContext;

pub enum ModuleTaskKind {
  Module(ModuleIdx),
  /// Position in the configured polyfill list.
  Polyfill(usize),
}

pub struct ModuleTask {
  ctx: Arc<TaskContext>,
  kind: ModuleTaskKind,
  id: ModuleId,
  importer: Option<ModuleId>,
}

impl ModuleTask {
  pub fn new(
    ctx: Arc<TaskContext>,
    kind: ModuleTaskKind,
    id: ModuleId,
    importer: Option<ModuleId>,
  ) -> Self {
    Self { ctx, kind, id, importer }
  }

  pub async fn run(self) {
    if let Err(err) = self.run_inner().await {
      // The loader stops listening after the first error.
      let _ = self.ctx.tx.send(ModuleLoaderMsg::BuildError(err)).await;
    }
  }

  async fn run_inner(&self) -> BuildResult<()> {
    let root = &self.ctx.options.project_root;
    let source: ArcStr = self
      .ctx
      .fs
      .read_to_string(self.id.as_path())
      .map_err(|source| BuildError::Load {
        module: self.id.stabilize(root),
        importer: self.importer.as_ref().map(|importer| importer.stabilize(root)),
        source,
      })?
      .into();

    let stable_id = self.id.stabilize(root);
    let (source_hash, transformed) = self.ctx.transform(&self.id, &stable_id, &source).await?;
    trace!(module = %stable_id, dependencies = transformed.dependencies.len(), "transformed");

    let msg = match self.kind {
      ModuleTaskKind::Module(idx) => {
        let resolved_deps = transformed
          .dependencies
          .iter()
          .map(|dep| self.ctx.resolve(&self.id, &dep.specifier))
          .collect::<BuildResult<Vec<_>>>()?;

        ModuleLoaderMsg::ModuleDone(Box::new(ModuleTaskResult {
          idx,
          id: self.id.clone(),
          stable_id,
          source,
          source_hash,
          transformed,
          resolved_deps,
        }))
      }
      ModuleTaskKind::Polyfill(slot) => {
        ModuleLoaderMsg::PolyfillDone(Box::new(PolyfillTaskResult {
          slot,
          id: self.id.clone(),
          stable_id,
          source,
          transformed,
        }))
      }
    };

    let _ = self.ctx.tx.send(msg).await;
    Ok(())
  }
}
