//! Spec loading and normalization.
//!
//! Ingests a raw AsyncAPI document (YAML or JSON), inlines every internal
//! `$ref`, computes the server connection URL and partitions channels by
//! direction. The output is a [`ServiceSpec`]: a strongly-typed, fully
//! resolved view of the document that the model builder consumes without
//! ever touching the raw representation again.

mod build;
mod load;
mod types;

pub use build::*;
pub use load::*;
pub use types::*;
