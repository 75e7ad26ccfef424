pub mod build_phase;
pub mod bundle_output;

use std::sync::Arc;

use transpack_common::NormalizedBundlerOptions;
use transpack_resolver::Resolve;

pub type SharedResolver = Arc<dyn Resolve>;
pub type SharedOptions = Arc<NormalizedBundlerOptions>;
