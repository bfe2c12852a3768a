//! # busgen
//!
//! Generate complete NATS message-bus microservices from AsyncAPI documents.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! 1. [`spec`] - load a YAML/JSON document, inline every internal `$ref`
//!    and build a typed [`ServiceSpec`] with channels partitioned by
//!    direction (`publish` operations are consumed by the service,
//!    `subscribe` operations are produced by it).
//! 2. [`model`] - simplify payload schemas into Rust records and enums,
//!    classify NATS bindings (plain subject, queue group, durable stream)
//!    and assign every generated name through the [`registry`], which
//!    keeps them stable and collision-free.
//! 3. [`generator`] - render the full project tree as strings, cross-check
//!    it (env-var references, schema file paths) and only then write it
//!    out. Emission is all-or-nothing and byte-for-byte deterministic.
//!
//! ```rust,ignore
//! use busgen::generator::{generate_project_from_spec, GenerateOptions};
//!
//! let opts = GenerateOptions { output_root: "my-service".into(), force: false };
//! generate_project_from_spec("asyncapi.yaml".as_ref(), &opts)?;
//! ```

pub mod cli;
pub mod errors;
pub mod generator;
pub mod model;
pub mod registry;
pub mod spec;

pub use errors::{ConsistencyError, ModelError, SpecError};
pub use generator::{
    check_consistency, generate_project, generate_project_from_spec, render_project,
    GenerateOptions, RenderedTree,
};
pub use model::{build_model, ServiceModel};
pub use spec::{load_spec, load_spec_from_value, ServiceSpec};
