use std::{iter, path::Path};

use oxc_index::{index_vec, IndexVec};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use transpack_common::{Module, ModuleFlags, ModuleId, ModuleIdx, Polyfill};
use transpack_resolver::Resolve;

use crate::module_loader::ModuleLoaderOutput;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Status {
  ToBeExecuted(ModuleIdx),
  WaitForExit(ModuleIdx),
}

/// Every module of a build, indexed by its numeric module ID.
///
/// IDs are assigned by sorting on `stable_id`, so they only depend on which modules are
/// reachable, never on the order transforms happened to finish in.
#[derive(Debug)]
pub struct ModuleGraph {
  pub modules: IndexVec<ModuleIdx, Module>,
  id_to_idx: FxHashMap<ModuleId, ModuleIdx>,
  pub entries: Vec<ModuleIdx>,
  pub polyfills: Vec<Polyfill>,
  pub run_before_main: Vec<ModuleIdx>,
}

impl ModuleGraph {
  pub(crate) fn new(output: ModuleLoaderOutput) -> Self {
    let ModuleLoaderOutput { modules, entries, polyfills, .. } = output;

    let mut order = modules.indices().collect::<Vec<_>>();
    order.sort_by(|a, b| {
      let (a, b) = (&modules[*a], &modules[*b]);
      a.stable_id.cmp(&b.stable_id).then_with(|| a.id.cmp(&b.id))
    });

    let mut remap: IndexVec<ModuleIdx, ModuleIdx> = index_vec![ModuleIdx::new(0); modules.len()];
    for (new_idx, old_idx) in order.iter().enumerate() {
      remap[*old_idx] = ModuleIdx::new(new_idx);
    }

    let mut slots = modules.into_iter().map(Some).collect::<IndexVec<ModuleIdx, _>>();
    let modules = order
      .iter()
      .filter_map(|old_idx| slots[*old_idx].take())
      .map(|mut module| {
        module.idx = remap[module.idx];
        module.dependencies.iter_mut().for_each(|dep| dep.target = remap[dep.target]);
        module
      })
      .collect::<IndexVec<ModuleIdx, _>>();

    let id_to_idx =
      modules.iter_enumerated().map(|(idx, module)| (module.id.clone(), idx)).collect();
    let entries = entries.into_iter().map(|idx| remap[idx]).collect();

    Self { modules, id_to_idx, entries, polyfills, run_before_main: vec![] }
  }

  pub fn idx_of(&self, id: &ModuleId) -> Option<ModuleIdx> {
    self.id_to_idx.get(id).copied()
  }

  pub fn module_by_id(&self, id: &ModuleId) -> Option<&Module> {
    self.idx_of(id).map(|idx| &self.modules[idx])
  }

  pub fn len(&self) -> usize {
    self.modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }

  /// Marks the modules that have to run before the entries. `names` may be absolute paths,
  /// paths relative to `root` or specifiers resolvable from `root`. Names that are not part of
  /// the graph are skipped.
  pub fn mark_run_before_main(&mut self, names: &[String], resolver: &dyn Resolve, root: &Path) {
    for name in names {
      let candidate = ModuleId::new(&*root.join(name).to_string_lossy());
      let idx = self.idx_of(&candidate).or_else(|| {
        let resolved = resolver.resolve(None, name).ok()?;
        self.idx_of(&ModuleId::new(resolved))
      });

      match idx {
        Some(idx) if !self.run_before_main.contains(&idx) => {
          self.modules[idx].flags.insert(ModuleFlags::RUN_BEFORE_MAIN);
          self.run_before_main.push(idx);
        }
        Some(_) => {}
        None => trace!(module = %name, "run-before-main module is not part of the graph"),
      }
    }
  }

  /// Import cycles reachable from the entries, each listed from the first module entered to the
  /// one closing the cycle. Cycles are legal, this only feeds warnings.
  pub fn circular_dependencies(&self) -> Vec<Box<[ModuleIdx]>> {
    let mut execution_stack =
      self.entries.iter().rev().map(|idx| Status::ToBeExecuted(*idx)).collect::<Vec<_>>();

    let mut executed_ids = FxHashSet::default();
    let mut stack_indexes_of_executing_id = FxHashMap::default();
    let mut seen_cycles = FxHashSet::default();
    let mut circular_dependencies = vec![];

    while let Some(status) = execution_stack.pop() {
      match status {
        Status::ToBeExecuted(id) => {
          if executed_ids.contains(&id) {
            // Still executing means `id` required itself through the chain above it.
            if let Some(index) = stack_indexes_of_executing_id.get(&id).copied() {
              let cycle = execution_stack[index..]
                .iter()
                .filter_map(|action| match action {
                  Status::ToBeExecuted(_) => None,
                  Status::WaitForExit(id) => Some(*id),
                })
                .chain(iter::once(id))
                .collect::<Box<[_]>>();
              if seen_cycles.insert(cycle.clone()) {
                circular_dependencies.push(cycle);
              }
            }
          } else {
            executed_ids.insert(id);
            execution_stack.push(Status::WaitForExit(id));
            stack_indexes_of_executing_id.insert(id, execution_stack.len() - 1);
            execution_stack.extend(
              self.modules[id].dependency_ids().into_iter().rev().map(Status::ToBeExecuted),
            );
          }
        }
        Status::WaitForExit(id) => {
          stack_indexes_of_executing_id.remove(&id);
        }
      }
    }

    circular_dependencies
  }

  pub fn circular_dependency_warnings(&self) -> Vec<anyhow::Error> {
    self
      .circular_dependencies()
      .iter()
      .map(|cycle| {
        let paths =
          cycle.iter().map(|idx| self.modules[*idx].stable_id.as_str()).collect::<Vec<_>>();
        anyhow::anyhow!("Circular dependency: {}.", paths.join(" -> "))
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use std::{path::Path, sync::Arc};

  use arcstr::ArcStr;
  use oxc_index::IndexVec;
  use transpack_common::{
    Module, ModuleFlags, ModuleId, ModuleIdx, ResolvedDependency, TransformOutput,
  };
  use transpack_resolver::{Resolve, ResolveError};

  use super::ModuleGraph;
  use crate::module_loader::ModuleLoaderOutput;

  struct NoResolve;

  impl Resolve for NoResolve {
    fn resolve(&self, _: Option<&Path>, specifier: &str) -> Result<ArcStr, ResolveError> {
      Err(ResolveError::NotFound(specifier.to_string()))
    }
  }

  /// `files` in discovery order, each with the discovery indices it depends on.
  fn loader_output(files: &[(&str, &[usize])]) -> ModuleLoaderOutput {
    let modules = files
      .iter()
      .enumerate()
      .map(|(idx, (name, deps))| Module {
        idx: ModuleIdx::new(idx),
        id: ModuleId::new(format!("/root/{name}")),
        stable_id: (*name).to_string(),
        source: ArcStr::new(),
        source_hash: 0,
        transformed: Arc::new(TransformOutput::default()),
        dependencies: deps
          .iter()
          .map(|dep| ResolvedDependency {
            specifier: format!("./{}", files[*dep].0),
            spans: vec![],
            target: ModuleIdx::new(*dep),
          })
          .collect(),
        flags: ModuleFlags::empty(),
      })
      .collect::<IndexVec<ModuleIdx, _>>();
    ModuleLoaderOutput {
      modules,
      entries: vec![ModuleIdx::new(0)],
      polyfills: vec![],
      warnings: vec![],
    }
  }

  #[test]
  fn ids_follow_stable_id_order() {
    let graph =
      ModuleGraph::new(loader_output(&[("c.js", &[2, 1]), ("a.js", &[]), ("b.js", &[1])]));

    let names = graph.modules.iter().map(|module| module.stable_id.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["a.js", "b.js", "c.js"]);
    assert_eq!(graph.entries, [ModuleIdx::new(2)]);

    let entry = &graph.modules[ModuleIdx::new(2)];
    assert_eq!(entry.dependency_ids(), [ModuleIdx::new(1), ModuleIdx::new(0)]);
    assert_eq!(graph.idx_of(&ModuleId::new("/root/b.js")), Some(ModuleIdx::new(1)));
    assert!(graph.modules.iter_enumerated().all(|(idx, module)| module.idx == idx));
  }

  #[test]
  fn detects_cycles() {
    let graph =
      ModuleGraph::new(loader_output(&[("a.js", &[1]), ("b.js", &[2]), ("c.js", &[1])]));
    let warnings = graph.circular_dependency_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].to_string(), "Circular dependency: b.js -> c.js -> b.js.");
  }

  #[test]
  fn run_before_main_only_includes_graph_modules() {
    let mut graph =
      ModuleGraph::new(loader_output(&[("index.js", &[1]), ("InitializeCore.js", &[])]));
    graph.mark_run_before_main(
      &["InitializeCore.js".to_string(), "missing.js".to_string(), "InitializeCore.js".to_string()],
      &NoResolve,
      Path::new("/root"),
    );

    let idx = graph.idx_of(&ModuleId::new("/root/InitializeCore.js")).unwrap();
    assert_eq!(graph.run_before_main, [idx]);
    assert!(graph.modules[idx].flags.contains(ModuleFlags::RUN_BEFORE_MAIN));
  }
}
