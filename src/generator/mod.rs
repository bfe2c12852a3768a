//! Code generation: template rendering and file tree assembly.
//!
//! The renderer is a pure function from the service model to a map of
//! relative paths to file contents; the assembler cross-checks the rendered
//! tree (env-var references, schema file paths) and only then touches the
//! filesystem. Emission is all-or-nothing: nothing is written unless every
//! check passes.

mod project;
mod templates;

pub use project::*;
pub use templates::*;
