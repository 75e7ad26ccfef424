mod module_wrapper;
mod prelude;
mod rewrite_dependencies;

use std::sync::Arc;

use arcstr::ArcStr;
use transpack_common::{Module, OutputAsset, Polyfill};
use transpack_error::{BuildError, BuildResult};
use transpack_sourcemap::{lines_count, JoinedSource, LineMapping, SourceJoiner, SourceMapSource};
use transpack_utils::rayon::{IntoParallelRefIterator, ParallelIterator};

use self::{
  module_wrapper::ModuleWrapper,
  prelude::{render_prelude, RUNTIME},
  rewrite_dependencies::rewrite_dependencies,
};
use crate::{
  graph::ModuleGraph,
  types::{bundle_output::BundleOutput, SharedOptions},
};

struct RenderedChunk {
  code: String,
  mapping: Option<LineMapping>,
}

impl RenderedChunk {
  fn append_to(self, joiner: &mut SourceJoiner<'_>) {
    match self.mapping {
      Some(mapping) => joiner.append_source(SourceMapSource::new(self.code, mapping)),
      None => joiner.append_source(self.code),
    }
  }
}

/// Serializes a finished graph: prelude, module runtime, polyfills, every module in ID order,
/// then the run statements of the run-before-main modules and of the entries.
pub struct GenerateStage<'a> {
  graph: &'a ModuleGraph,
  options: &'a SharedOptions,
}

impl<'a> GenerateStage<'a> {
  pub fn new(graph: &'a ModuleGraph, options: &'a SharedOptions) -> Self {
    Self { graph, options }
  }

  pub fn generate(&self) -> BuildResult<BundleOutput> {
    let polyfills =
      self.graph.polyfills.iter().map(|polyfill| self.render_polyfill(polyfill)).collect::<Vec<_>>();
    let modules = self
      .graph
      .modules
      .par_iter()
      .map(|module| self.render_module(module))
      .collect::<BuildResult<Vec<_>>>()?;

    let mut joiner = SourceJoiner::new(self.options.sourcemap);
    joiner.append_source(render_prelude(self.options.dev));
    joiner.append_source(ModuleWrapper::Script.wrap(RUNTIME));
    polyfills.into_iter().chain(modules).for_each(|chunk| chunk.append_to(&mut joiner));

    for idx in self.graph.run_before_main.iter().chain(&self.graph.entries) {
      joiner.append_source(self.options.run_module_statement(*idx));
    }

    let JoinedSource { mut code, map } = joiner.join();
    let bundle_filename = self.options.bundle_filename.clone();
    let map = map.map(|map| map.to_json_string());

    let mut assets = Vec::with_capacity(2);
    if let Some(map) = &map {
      let map_filename = format!("{bundle_filename}.map");
      code.push_str("\n//# sourceMappingURL=");
      code.push_str(map_filename.rsplit('/').next().unwrap_or(&map_filename));
      assets.push(OutputAsset { filename: map_filename, content: map.clone() });
    }
    assets.insert(0, OutputAsset { filename: bundle_filename, content: code.clone() });

    Ok(BundleOutput { code, map, assets, warnings: vec![] })
  }

  fn render_module(&self, module: &Module) -> BuildResult<RenderedChunk> {
    let code = rewrite_dependencies(module)
      .map_err(|cause| BuildError::Transform { module: module.stable_id.clone(), cause })?;
    let dependencies = module.dependency_ids();
    let wrapper = ModuleWrapper::Module {
      idx: module.idx,
      dependencies: &dependencies,
      verbose_name: self.options.dev.then_some(module.stable_id.as_str()),
    };

    let mapping = self.line_mapping(&module.stable_id, &module.source, &code);
    Ok(RenderedChunk { code: wrapper.wrap(&code), mapping })
  }

  fn render_polyfill(&self, polyfill: &Polyfill) -> RenderedChunk {
    let code = &polyfill.transformed.code;
    let mapping = self.line_mapping(&polyfill.stable_id, &polyfill.source, code);
    RenderedChunk { code: ModuleWrapper::Script.wrap(code), mapping }
  }

  /// Code lines map one-to-one onto the lines of the original file. Wrappers never put a line
  /// break before the code, so the chunk starts on the code's first line.
  fn line_mapping(&self, stable_id: &str, source: &ArcStr, code: &str) -> Option<LineMapping> {
    self.options.sourcemap.then(|| LineMapping {
      source_name: stable_id.to_string(),
      source_content: Arc::from(source.as_str()),
      first_line: 0,
      mapped_lines: lines_count(code).min(lines_count(source)) + 1,
    })
  }
}
