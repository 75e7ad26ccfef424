oxc_index::define_index_type! {
  /// Numeric module ID. After the graph is sorted it is the ID written into the bundle.
  #[derive(Default)]
  pub struct ModuleIdx = u32;
}
