/// Defines `__d` and `__r`. Wrapped as a script like polyfills.
pub const RUNTIME: &str = include_str!("../runtime/require.js");

/// Globals every module may read before anything else ran.
pub fn render_prelude(dev: bool) -> String {
  let node_env = if dev { "development" } else { "production" };
  format!(
    "var __DEV__={dev},__METRO_GLOBAL_PREFIX__='',process=this.process||{{}};\
     process.env=process.env||{{}};\
     process.env.NODE_ENV=process.env.NODE_ENV||\"{node_env}\";"
  )
}

#[test]
fn prelude_reflects_dev_mode() {
  assert_eq!(
    render_prelude(true),
    "var __DEV__=true,__METRO_GLOBAL_PREFIX__='',process=this.process||{};process.env=process.env||{};process.env.NODE_ENV=process.env.NODE_ENV||\"development\";"
  );
  assert!(render_prelude(false).starts_with("var __DEV__=false,"));
  assert!(render_prelude(false).ends_with("||\"production\";"));
}
