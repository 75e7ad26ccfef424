use task_result::{ModuleTaskResult, PolyfillTaskResult};
use transpack_error::BuildError;

pub mod task_result;

pub enum ModuleLoaderMsg {
  ModuleDone(Box<ModuleTaskResult>),
  PolyfillDone(Box<PolyfillTaskResult>),
  BuildError(BuildError),
}
