use transpack_common::ModuleIdx;

const GLOBAL_OBJECT: &str = "typeof globalThis !== 'undefined' ? globalThis : typeof global !== 'undefined' ? global : typeof window !== 'undefined' ? window : this";

/// How a piece of code is embedded into the bundle. The code always starts on the first line of
/// the wrapper so that line `n` of the code stays line `n` of the wrapped chunk.
pub enum ModuleWrapper<'a> {
  /// A registered module: `__d(factory, id, [dependency ids], name?)`.
  Module { idx: ModuleIdx, dependencies: &'a [ModuleIdx], verbose_name: Option<&'a str> },
  /// Executed in place, outside of the module registry.
  Script,
}

impl ModuleWrapper<'_> {
  pub fn wrap(&self, code: &str) -> String {
    match self {
      Self::Module { idx, dependencies, verbose_name } => {
        let mut buffer = itoa::Buffer::new();
        let mut wrapped = String::with_capacity(code.len() + 64);
        wrapped.push_str("__d(function (global, require, module, exports) {");
        wrapped.push_str(code);
        wrapped.push_str("\n}, ");
        wrapped.push_str(buffer.format(idx.index()));
        wrapped.push_str(", [");
        for (nth, dependency) in dependencies.iter().enumerate() {
          if nth > 0 {
            wrapped.push_str(", ");
          }
          wrapped.push_str(buffer.format(dependency.index()));
        }
        wrapped.push(']');
        if let Some(name) = verbose_name {
          wrapped.push_str(", ");
          // A JSON string is a valid JS string literal.
          wrapped.push_str(&serde_json::Value::from(*name).to_string());
        }
        wrapped.push_str(");");
        wrapped
      }
      Self::Script => format!("(function (global) {{{code}\n}})({GLOBAL_OBJECT});"),
    }
  }
}

#[test]
fn wraps_modules_with_their_dependency_ids() {
  let dependencies = [ModuleIdx::new(1), ModuleIdx::new(0)];
  let wrapper = ModuleWrapper::Module {
    idx: ModuleIdx::new(2),
    dependencies: &dependencies,
    verbose_name: None,
  };
  assert_eq!(
    wrapper.wrap("require(1);"),
    "__d(function (global, require, module, exports) {require(1);\n}, 2, [1, 0]);"
  );

  let wrapper = ModuleWrapper::Module {
    idx: ModuleIdx::new(0),
    dependencies: &[],
    verbose_name: Some("src/Foo \"bar\".js"),
  };
  assert!(wrapper.wrap("").ends_with(r#"}, 0, [], "src/Foo \"bar\".js");"#));
}

#[test]
fn wraps_scripts_in_an_iife() {
  let wrapped = ModuleWrapper::Script.wrap("global.x = 1;");
  assert!(wrapped.starts_with("(function (global) {global.x = 1;\n})(typeof globalThis"));
  assert!(wrapped.ends_with(": this);"));
}
