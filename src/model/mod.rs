//! The typed service model built once per run.
//!
//! The model builder consumes the loader's [`crate::spec::ServiceSpec`],
//! simplifies every message payload into a record or discriminated-union
//! model, classifies each channel's transport binding and reserves every
//! generated name through the identifier registry. Nothing downstream of
//! this module ever looks at raw schema values again.

mod binding;
mod build;
mod schema;
mod types;

pub use binding::*;
pub use build::*;
pub use schema::*;
pub use types::*;
