mod module_task;
pub mod task_context;

use std::{collections::hash_map::Entry, sync::Arc};

use module_task::{ModuleTask, ModuleTaskKind};
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;
use task_context::TaskContext;
use tokio::{sync::mpsc::Receiver, task::JoinSet};
use tracing::warn;
use transpack_common::{
  Module, ModuleFlags, ModuleId, ModuleIdx, ModuleLoaderMsg, ModuleTaskResult, Polyfill,
  PolyfillTaskResult, ResolvedDependency,
};
use transpack_error::BuildResult;
use transpack_fs::OsFileSystem;
use transpack_utils::option_ext::OptionExt;

use crate::{
  transform_cache::{cache_key::CacheKey, TransformCache},
  types::{SharedOptions, SharedResolver},
  worker_pool::WorkerPool,
};

pub struct ModuleLoader {
  rx: Receiver<ModuleLoaderMsg>,
  remaining: u32,
  shared_context: Arc<TaskContext>,
  modules: IndexVec<ModuleIdx, Option<Module>>,
  polyfills: Vec<Option<Polyfill>>,
  visited: FxHashMap<ModuleId, ModuleIdx>,
  /// Dropping the loader aborts every task that is still running.
  tasks: JoinSet<()>,
}

#[derive(Debug)]
pub struct ModuleLoaderOutput {
  /// Modules in discovery order.
  pub modules: IndexVec<ModuleIdx, Module>,
  pub entries: Vec<ModuleIdx>,
  /// Polyfills in configured order.
  pub polyfills: Vec<Polyfill>,
  pub warnings: Vec<anyhow::Error>,
}

impl ModuleLoader {
  pub fn new(
    fs: OsFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    cache: Arc<TransformCache>,
    pool: Arc<WorkerPool>,
  ) -> BuildResult<Self> {
    // 1024 should be enough for most cases
    // over 1024 pending tasks are insane
    let (tx, rx) = tokio::sync::mpsc::channel(1024);

    let transform_options = options.transform_options();
    let options_hash = CacheKey::options_hash(&transform_options)?;

    let shared_context = Arc::new(TaskContext {
      fs,
      options,
      resolver,
      cache,
      pool,
      transform_options: Arc::new(transform_options),
      options_hash,
      tx,
    });

    Ok(Self {
      rx,
      remaining: 0,
      shared_context,
      modules: IndexVec::new(),
      polyfills: Vec::new(),
      visited: FxHashMap::default(),
      tasks: JoinSet::new(),
    })
  }

  /// Walks the dependency graph from `entries`. Polyfills are loaded alongside, but what
  /// they require is not followed. The first error aborts the traversal.
  pub async fn fetch_all_modules(
    mut self,
    entries: Vec<ModuleId>,
    polyfills: Vec<ModuleId>,
  ) -> BuildResult<ModuleLoaderOutput> {
    self.polyfills.resize_with(polyfills.len(), || None);
    for (slot, id) in polyfills.into_iter().enumerate() {
      self.spawn_task(ModuleTaskKind::Polyfill(slot), id, None);
    }

    let entries =
      entries.into_iter().map(|id| self.try_spawn_new_task(id, None)).collect::<Vec<_>>();

    let mut warnings: Vec<anyhow::Error> = vec![];

    while self.remaining > 0 {
      let Some(msg) = self.rx.recv().await else {
        break;
      };

      match msg {
        ModuleLoaderMsg::ModuleDone(task_result) => {
          let ModuleTaskResult {
            idx,
            id,
            stable_id,
            source,
            source_hash,
            transformed,
            resolved_deps,
          } = *task_result;

          let dependencies = transformed
            .dependencies
            .iter()
            .zip(resolved_deps)
            .map(|(dep, target)| ResolvedDependency {
              specifier: dep.specifier.clone(),
              spans: dep.spans.clone(),
              target: self.try_spawn_new_task(target, Some(&id)),
            })
            .collect();

          self.modules[idx] = Some(Module {
            idx,
            id,
            stable_id,
            source,
            source_hash,
            transformed,
            dependencies,
            flags: ModuleFlags::empty(),
          });
          self.remaining -= 1;
        }
        ModuleLoaderMsg::PolyfillDone(task_result) => {
          let PolyfillTaskResult { slot, id, stable_id, source, transformed } = *task_result;

          if !transformed.dependencies.is_empty() {
            let specifiers = transformed.dependencies.iter().map(|dep| dep.specifier.as_str());
            let warning = anyhow::anyhow!(
              "Polyfill `{stable_id}` requires {}, polyfills are scripts and their dependencies are not bundled",
              specifiers.map(|specifier| format!("`{specifier}`")).collect::<Vec<_>>().join(", ")
            );
            warn!("{warning}");
            warnings.push(warning);
          }

          self.polyfills[slot] = Some(Polyfill { id, stable_id, source, transformed });
          self.remaining -= 1;
        }
        ModuleLoaderMsg::BuildError(err) => {
          self.tasks.abort_all();
          return Err(err);
        }
      }
    }

    // Every spawned task reported back, so every slot is filled.
    let mut modules: IndexVec<ModuleIdx, Module> =
      self.modules.into_iter().map(OptionExt::unpack).collect();

    for &idx in &entries {
      modules[idx].flags.insert(ModuleFlags::ENTRY);
    }

    let polyfills = self.polyfills.into_iter().map(OptionExt::unpack).collect();

    Ok(ModuleLoaderOutput { modules, entries, polyfills, warnings })
  }

  fn try_spawn_new_task(&mut self, id: ModuleId, importer: Option<&ModuleId>) -> ModuleIdx {
    match self.visited.entry(id) {
      Entry::Occupied(visited) => *visited.get(),
      Entry::Vacant(not_visited) => {
        let idx = self.modules.push(None);
        let id = not_visited.key().clone();
        not_visited.insert(idx);
        self.spawn_task(ModuleTaskKind::Module(idx), id, importer.cloned());
        idx
      }
    }
  }

  fn spawn_task(&mut self, kind: ModuleTaskKind, id: ModuleId, importer: Option<ModuleId>) {
    self.remaining += 1;
    let task = ModuleTask::new(Arc::clone(&self.shared_context), kind, id, importer);
    self.tasks.spawn(task.run());
  }
}
