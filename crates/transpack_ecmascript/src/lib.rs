mod commonjs_transformer;
mod require_collector;

pub use crate::commonjs_transformer::CommonJsTransformer;
pub use crate::require_collector::collect_requires;
