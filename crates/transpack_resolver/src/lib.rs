// A wrapper around the `oxc_resolver` crate to provide a bundler-specific API.

mod error;
mod resolver;

pub use crate::error::ResolveError;
pub use crate::resolver::{Resolve, Resolver};
