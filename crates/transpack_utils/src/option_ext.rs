use std::sync::LazyLock;

use regex::Regex;

static MODULE_MATCHER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\w+::)").unwrap());

pub trait OptionExt<T> {
  fn unpack(self) -> T;
}

impl<T> OptionExt<T> for Option<T> {
  /// Similar to `unwrap`, but names the type that was missing in the panic message.
  fn unpack(self) -> T {
    self.unwrap_or_else(|| {
      let type_name = MODULE_MATCHER_RE.replace_all(std::any::type_name::<T>(), "");
      panic!("Got `None` value when calling `OptionExt::unpack()` on `{type_name}`")
    })
  }
}

#[test]
#[should_panic(expected = "on `Vec<String>`")]
fn unpack_names_the_missing_type() {
  None::<Vec<String>>.unpack();
}
