//! # CLI Module
//!
//! Command-line interface for the busgen code generator.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Generate a complete service project from an AsyncAPI document:
//!
//! ```bash
//! busgen generate --spec asyncapi.yaml --output my-service
//! ```
//!
//! Options:
//! - `--spec <FILE>` - Path to the AsyncAPI document (required)
//! - `--output <DIR>` - Output directory for the generated project (required)
//! - `--force` - Replace the output directory if it already exists
//!
//! ### `check`
//!
//! Parse and model a document without writing anything:
//!
//! ```bash
//! busgen check --spec asyncapi.yaml
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
